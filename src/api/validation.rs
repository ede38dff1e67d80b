use super::ApiError;
use crate::config::CatalogConfig;
use crate::models::page::PageRequest;

/// Resolves `page`/`limit` query values. `limit` falls back to the configured
/// default and is clamped to `1..=max_page_size`.
pub fn resolve_page(
    page: Option<u64>,
    limit: Option<u64>,
    catalog: &CatalogConfig,
) -> Result<PageRequest, ApiError> {
    let page = page.unwrap_or(1);
    if page == 0 {
        return Err(ApiError::validation(
            "Invalid page: 0. Pages are numbered from 1",
        ));
    }

    let limit = limit
        .unwrap_or(catalog.default_page_size)
        .clamp(1, catalog.max_page_size.max(1));

    // The row offset is bound as a signed 64-bit integer.
    let offset = (page - 1)
        .checked_mul(limit)
        .filter(|offset| i64::try_from(*offset).is_ok());
    if offset.is_none() {
        return Err(ApiError::validation(format!(
            "Invalid page: {}. Page is out of range",
            page
        )));
    }

    Ok(PageRequest::new(page, limit))
}

pub fn parse_bool(field: &str, value: &str) -> Result<bool, ApiError> {
    match value {
        "1" | "true" | "True" => Ok(true),
        "0" | "false" | "False" => Ok(false),
        _ => Err(ApiError::validation(format!(
            "Invalid value for {}: '{}'. Expected 0, 1, true or false",
            field, value
        ))),
    }
}

pub fn parse_number<T: std::str::FromStr>(field: &str, value: &str) -> Result<T, ApiError> {
    value.trim().parse().map_err(|_| {
        ApiError::validation(format!(
            "Invalid value for {}: '{}'. Expected a non-negative integer",
            field, value
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> CatalogConfig {
        CatalogConfig {
            default_page_size: 6,
            max_page_size: 100,
        }
    }

    #[test]
    fn test_resolve_page_defaults() {
        let page = resolve_page(None, None, &catalog()).unwrap();
        assert_eq!(page, PageRequest::new(1, 6));
    }

    #[test]
    fn test_resolve_page_clamps_limit() {
        assert_eq!(
            resolve_page(Some(2), Some(500), &catalog()).unwrap(),
            PageRequest::new(2, 100)
        );
        assert_eq!(
            resolve_page(Some(1), Some(0), &catalog()).unwrap(),
            PageRequest::new(1, 1)
        );
    }

    #[test]
    fn test_resolve_page_rejects_zero_page() {
        assert!(resolve_page(Some(0), None, &catalog()).is_err());
    }

    #[test]
    fn test_resolve_page_rejects_offset_overflow() {
        assert!(resolve_page(Some(u64::MAX), None, &catalog()).is_err());
        assert!(resolve_page(Some(u64::MAX / 2), Some(100), &catalog()).is_err());
        assert!(resolve_page(Some(1_000_000), Some(100), &catalog()).is_ok());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("is_favorited", "1").unwrap());
        assert!(parse_bool("is_favorited", "True").unwrap());
        assert!(!parse_bool("is_favorited", "0").unwrap());
        assert!(!parse_bool("is_favorited", "false").unwrap());
        assert!(parse_bool("is_favorited", "yes").is_err());
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number::<u64>("page", "3").unwrap(), 3);
        assert!(parse_number::<u64>("page", "-1").is_err());
        assert!(parse_number::<u64>("page", "abc").is_err());
    }
}
