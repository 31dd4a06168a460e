// Maps stored image paths to the URL the browser should request

const PLACEHOLDER: &str = "/images/placeholder.png";
const PRODUCT_IMAGES: &str = "/images/products/";

/// Directory, relative to the web root, that product uploads are written to
pub const PRODUCT_IMAGE_DIR: &str = "images/products";

/// Converts a stored image path into a web path
///
/// Paths written by older versions of the catalog (`ProductImages/...` and
/// `uploads/...`) are mapped onto the current product image directory.
///
/// # Example
/// ```
/// use catalog_admin::domain::product::image_web_path;
///
/// assert_eq!(image_web_path(None), "/images/placeholder.png");
/// assert_eq!(
///     image_web_path(Some("images/products/lamp_1a2b3c4d.png")),
///     "/images/products/lamp_1a2b3c4d.png"
/// );
/// ```
pub fn image_web_path(image_path: Option<&str>) -> String {
    let path = match image_path {
        Some(path) if !path.is_empty() => path,
        _ => return PLACEHOLDER.to_string(),
    };

    if let Some(rest) = path.strip_prefix("ProductImages/") {
        return format!("{PRODUCT_IMAGES}{rest}");
    }
    if let Some(rest) = path.strip_prefix("uploads/") {
        return format!("{PRODUCT_IMAGES}{rest}");
    }
    if path.starts_with("images/products/") {
        return format!("/{path}");
    }
    if path.starts_with('/') {
        return path.to_string();
    }
    format!("{PRODUCT_IMAGES}{path}")
}
