//! Object-storage endpoint URLs.

/// Path prefix of the storage service.
pub const STORAGE_PATH: &str = "/storage/v1";

/// Upload endpoint for one object.
pub fn object_url(base_url: &str, bucket: &str, path: &str) -> String {
    format!("{base_url}{STORAGE_PATH}/object/{bucket}/{path}")
}

/// Bulk-delete endpoint of a bucket.
pub fn bucket_url(base_url: &str, bucket: &str) -> String {
    format!("{base_url}{STORAGE_PATH}/object/{bucket}")
}

/// Public download URL of an object in a public bucket.
pub fn public_url(base_url: &str, bucket: &str, path: &str) -> String {
    format!("{base_url}{STORAGE_PATH}/object/public/{bucket}/{path}")
}
