//! Canonical CSV template downloads.

use actix_web::{HttpResponse, get, web};

use crate::auth::ApiKeyAuth;
use crate::error::{AppError, AppResult};
use crate::models::{CANONICAL_FIELDS, VehicleClass};

/// Configure template routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(download_template);
}

/// One header line with every canonical column in template order.
fn template_csv() -> String {
    let headers: Vec<&str> = CANONICAL_FIELDS
        .iter()
        .map(|f| f.template_header())
        .collect();
    format!("{}\r\n", headers.join(","))
}

/// Download the canonical upload template for a vehicle class.
///
/// GET /api/v1/templates/{class}
///
/// The template is the same for every class; the class in the path keeps
/// the download button on each class tab pointing at a sensibly named file.
#[utoipa::path(
    get,
    path = "/api/v1/templates/{class}",
    tag = "Templates",
    params(
        ("class" = String, Path, description = "Vehicle class: two_wheeler, four_wheeler or commercial")
    ),
    responses(
        (status = 200, description = "CSV template", content_type = "text/csv"),
        (status = 400, description = "Unknown vehicle class", body = crate::error::ErrorResponse),
        (status = 403, description = "Tenant-bound key required")
    ),
    security(
        ("api_key" = [])
    )
)]
#[get("/templates/{class}")]
pub async fn download_template(
    auth: ApiKeyAuth,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    if auth.caller.tenant_id.is_none() {
        return Err(AppError::Forbidden(
            "Tenant-bound key required for template downloads".to_string(),
        ));
    }

    let raw = path.into_inner();
    let class = VehicleClass::parse(&raw)
        .ok_or_else(|| AppError::InvalidInput(format!("Unknown vehicle class '{}'", raw)))?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}_template.csv\"", class.as_str()),
        ))
        .body(template_csv()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_has_all_canonical_headers() {
        let csv = template_csv();
        let line = csv.trim_end();

        assert_eq!(line.split(',').count(), CANONICAL_FIELDS.len());
        assert!(line.starts_with("Registration No,"));
        assert!(line.ends_with(",Address"));
    }
}
