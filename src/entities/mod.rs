pub mod cycle;
pub mod cycle_attachment;
pub mod faulty_part;
pub mod faulty_part_image;
pub mod vehicle;
pub mod vehicle_document;
pub mod vehicle_image;
pub mod wheel_image;
