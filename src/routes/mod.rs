mod backup;
mod cycles;
mod form;
mod home;
mod media;
mod vehicles;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

// Define the OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // General endpoints
        home::root,
        home::health,
        // Cycle endpoints
        cycles::create_cycle,
        cycles::list_cycles,
        cycles::search_cycles,
        cycles::get_cycle,
        cycles::update_cycle,
        cycles::delete_cycle,
        cycles::add_attachments,
        cycles::cycle_images,
        cycles::replace_attachment_file,
        cycles::delete_attachment,
        // Vehicle endpoints
        vehicles::create_vehicle,
        vehicles::list_vehicles,
        vehicles::get_vehicle,
        vehicles::update_vehicle,
        vehicles::delete_vehicle,
        vehicles::add_vehicle_files,
        vehicles::replace_vehicle_file,
        vehicles::delete_vehicle_file,
        vehicles::add_faulty_part,
        vehicles::delete_faulty_part,
        // Backup and media
        backup::backup_cycles,
        backup::backup_vehicles,
        media::serve_media,
    ),
    components(
        schemas(
            home::HealthResponse,
            cycles::AttachmentResponse,
            cycles::CycleResponse,
            cycles::CycleImage,
            cycles::CycleImagesResponse,
            vehicles::VehicleResponse,
            vehicles::VehicleFileResponse,
            vehicles::FaultyPartImageResponse,
            vehicles::FaultyPartResponse,
            vehicles::VehicleDetailResponse,
            crate::models::forms::CycleUpdate,
            crate::models::forms::VehicleUpdate,
            crate::models::kinds::VehicleFileKind,
            crate::entities::cycle::ControlType,
            crate::entities::cycle_attachment::FileType,
            crate::services::records::DeleteSummary,
        )
    ),
    tags(
        (name = "General", description = "General API information"),
        (name = "Cycles", description = "Inspection cycles and their attachments"),
        (name = "Vehicles", description = "Vehicles, faulty parts, images and documents"),
        (name = "Backup", description = "Zip exports filtered by date range and identifier"),
        (name = "Media", description = "Stored files")
    ),
    info(
        title = "AssetVault API",
        version = "0.1.0",
        description = "Record keeping for vehicles and inspection cycles with their photos and documents",
    )
)]
struct ApiDoc;

pub fn create_routes(state: AppState) -> Router {
    // Swagger UI (stateless)
    let swagger_router: Router = SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into();

    let cycle_routes = Router::new()
        .route("/cycles", post(cycles::create_cycle).get(cycles::list_cycles))
        .route("/cycles/search", get(cycles::search_cycles))
        .route(
            "/cycles/{cycle_id}",
            get(cycles::get_cycle)
                .put(cycles::update_cycle)
                .delete(cycles::delete_cycle),
        )
        .route("/cycles/{cycle_id}/attachments", post(cycles::add_attachments))
        .route("/api/cycle-images/{cycle_id}", get(cycles::cycle_images))
        .route("/attachments/{id}/file", put(cycles::replace_attachment_file))
        .route("/attachments/{id}", delete(cycles::delete_attachment));

    let vehicle_routes = Router::new()
        .route(
            "/vehicles",
            post(vehicles::create_vehicle).get(vehicles::list_vehicles),
        )
        .route(
            "/vehicles/{id}",
            get(vehicles::get_vehicle)
                .put(vehicles::update_vehicle)
                .delete(vehicles::delete_vehicle),
        )
        .route("/vehicles/{id}/files", post(vehicles::add_vehicle_files))
        .route(
            "/vehicles/files/{kind}/{file_id}",
            put(vehicles::replace_vehicle_file).delete(vehicles::delete_vehicle_file),
        )
        .route("/vehicles/{id}/faulty-parts", post(vehicles::add_faulty_part))
        .route("/faulty-parts/{id}", delete(vehicles::delete_faulty_part));

    let app_routes = Router::new()
        .route("/", get(home::root))
        .route("/health", get(home::health))
        .route("/backup", get(backup::backup_vehicles))
        .route("/backup/cycles", get(backup::backup_cycles))
        .route("/media/{*path}", get(media::serve_media))
        .merge(cycle_routes)
        .merge(vehicle_routes)
        .with_state(state);

    // Merge Swagger UI (which has no state) with the rest
    Router::new().merge(swagger_router).merge(app_routes)
}
