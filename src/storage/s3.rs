//! S3 object-store client
//!
//! Talks to Amazon S3 and S3-compatible services (MinIO, R2, Spaces, ...)
//! over plain HTTPS with AWS Signature Version 4, avoiding the heavyweight
//! aws-sdk-s3 dependency for better compile times and smaller binaries.
//! Presigned GET URLs are produced with the same SigV4 key-derivation chain.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::{Client, Method, Response, StatusCode};
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use super::types::{ObjectEntry, S3ClientConfig, StorageError};
use super::ObjectStore;

type HmacSha256 = Hmac<Sha256>;

const EMPTY_PAYLOAD_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// S3 client for a single effective signing configuration.
///
/// Unlike a per-bucket session, the bucket is supplied per call: one client
/// handle serves every bucket reachable with the same region and credentials.
pub struct S3Client {
    config: S3ClientConfig,
    client: Client,
}

impl S3Client {
    /// Create a new client with a bounded network timeout.
    pub fn new(config: S3ClientConfig) -> Result<Self, StorageError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StorageError::InvalidConfig(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Get the S3 endpoint URL
    fn endpoint(&self) -> String {
        if let Some(ref endpoint) = self.config.endpoint {
            endpoint.trim_end_matches('/').to_string()
        } else {
            format!("https://s3.{}.amazonaws.com", self.config.region)
        }
    }

    /// Build the URL for an object (or the bucket root when `key` is empty).
    fn build_url(&self, bucket: &str, key: &str) -> String {
        let endpoint = self.endpoint();
        let key = encode_key_path(key.trim_start_matches('/'));

        if self.config.path_style {
            // Path-style: https://endpoint/bucket/key
            if key.is_empty() {
                format!("{}/{}", endpoint, bucket)
            } else {
                format!("{}/{}/{}", endpoint, bucket, key)
            }
        } else {
            // Virtual-hosted style: https://bucket.endpoint/key
            let endpoint_without_scheme =
                endpoint.replace("https://", "").replace("http://", "");
            let scheme = if endpoint.starts_with("http://") { "http" } else { "https" };

            if key.is_empty() {
                format!("{}://{}.{}", scheme, bucket, endpoint_without_scheme)
            } else {
                format!("{}://{}.{}/{}", scheme, bucket, endpoint_without_scheme, key)
            }
        }
    }

    /// Sign a request with AWS Signature Version 4, returning the
    /// Authorization header value. `headers` is extended with the x-amz-*
    /// and host headers that take part in the signature.
    fn sign_request(
        &self,
        method: &str,
        url: &str,
        headers: &mut HashMap<String, String>,
        payload_hash: &str,
    ) -> Result<String, StorageError> {
        let now: DateTime<Utc> = Utc::now();
        let date_stamp = now.format("%Y%m%d").to_string();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();

        headers.insert("x-amz-date".to_string(), amz_date.clone());
        headers.insert("x-amz-content-sha256".to_string(), payload_hash.to_string());

        let parsed = url::Url::parse(url)
            .map_err(|e| StorageError::InvalidConfig(e.to_string()))?;

        let host = parsed.host_str().unwrap_or("");
        let path = parsed.path();
        let query = parsed.query().unwrap_or("");

        headers.insert("host".to_string(), host.to_string());

        let mut signed_headers: Vec<&str> = headers.keys().map(|s| s.as_str()).collect();
        signed_headers.sort_unstable();
        let signed_headers_str = signed_headers.join(";");

        let mut canonical_headers = String::new();
        for header in &signed_headers {
            if let Some(value) = headers.get(*header) {
                canonical_headers.push_str(&format!("{}:{}\n", header.to_lowercase(), value.trim()));
            }
        }

        let canonical_request = format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            method, path, query, canonical_headers, signed_headers_str, payload_hash
        );

        let canonical_request_hash = hex::encode(Sha256::digest(canonical_request.as_bytes()));

        let credential_scope = format!("{}/{}/s3/aws4_request", date_stamp, self.config.region);
        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{}\n{}\n{}",
            amz_date, credential_scope, canonical_request_hash
        );

        let signature = hex::encode(self.derive_signature(&date_stamp, &string_to_sign));

        Ok(format!(
            "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
            self.config.access_key_id, credential_scope, signed_headers_str, signature
        ))
    }

    /// SigV4 key-derivation chain: date -> region -> service -> request.
    fn derive_signature(&self, date_stamp: &str, string_to_sign: &str) -> Vec<u8> {
        let secret = format!("AWS4{}", self.config.secret_access_key.expose_secret());
        let k_date = hmac_sha256(secret.as_bytes(), date_stamp.as_bytes());
        let k_region = hmac_sha256(&k_date, self.config.region.as_bytes());
        let k_service = hmac_sha256(&k_region, b"s3");
        let k_signing = hmac_sha256(&k_service, b"aws4_request");
        hmac_sha256(&k_signing, string_to_sign.as_bytes())
    }

    /// Make a signed request to S3. Query parameters must be given in
    /// canonical (byte-sorted) order so the signature matches.
    async fn s3_request(
        &self,
        method: Method,
        bucket: &str,
        key: &str,
        query_params: Option<&[(&str, &str)]>,
    ) -> Result<Response, StorageError> {
        let mut url = self.build_url(bucket, key);
        if let Some(params) = query_params {
            let query: String = params
                .iter()
                .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
                .collect::<Vec<_>>()
                .join("&");
            if !query.is_empty() {
                url = format!("{}?{}", url, query);
            }
        }

        let mut headers = HashMap::new();
        let authorization =
            self.sign_request(method.as_str(), &url, &mut headers, EMPTY_PAYLOAD_SHA256)?;

        let mut request = self.client.request(method, &url);
        for (name, value) in headers {
            request = request.header(&name, &value);
        }
        request = request.header("Authorization", authorization);

        request
            .send()
            .await
            .map_err(|e| StorageError::NetworkError(e.to_string()))
    }
}

/// URI-encode each segment of an object key, preserving `/` separators.
fn encode_key_path(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Parse an S3 ListObjectsV2 XML response into entries plus an optional
/// continuation token. Directory markers (zero-size keys) are kept; filtering
/// is the caller's concern.
fn parse_list_response(xml: &str) -> Result<(Vec<ObjectEntry>, Option<String>), StorageError> {
    let mut entries = Vec::new();

    let contents_pattern = regex::Regex::new(r"(?s)<Contents>(.*?)</Contents>")
        .map_err(|e| StorageError::ParseError(e.to_string()))?;

    for cap in contents_pattern.captures_iter(xml) {
        if let Some(content) = cap.get(1) {
            let content_str = content.as_str();

            let Some(key) = extract_xml_tag(content_str, "Key") else {
                continue;
            };

            let size: u64 = extract_xml_tag(content_str, "Size")
                .and_then(|s| s.parse().ok())
                .unwrap_or(0);

            entries.push(ObjectEntry { key, size });
        }
    }

    let continuation_token = extract_xml_tag(xml, "NextContinuationToken");

    Ok((entries, continuation_token))
}

/// Extract content from an XML tag
fn extract_xml_tag(xml: &str, tag: &str) -> Option<String> {
    let pattern = format!(r"<{}[^>]*>([^<]*)</{}>", tag, tag);
    if let Ok(re) = regex::Regex::new(&pattern) {
        if let Some(cap) = re.captures(xml) {
            if let Some(content) = cap.get(1) {
                let text = content.as_str().trim().to_string();
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
    }
    None
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<ObjectEntry>, StorageError> {
        debug!(bucket, prefix, "list objects");

        let mut all_entries = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            // Canonical (sorted) parameter order; no delimiter, nested keys
            // are filtered downstream.
            let mut params: Vec<(&str, &str)> = Vec::new();
            let token_str: String;
            if let Some(ref token) = continuation_token {
                token_str = token.clone();
                params.push(("continuation-token", &token_str));
            }
            params.push(("list-type", "2"));
            params.push(("max-keys", "1000"));
            if !prefix.is_empty() {
                params.push(("prefix", prefix));
            }

            let response = self.s3_request(Method::GET, bucket, "", Some(&params)).await?;

            match response.status() {
                StatusCode::OK => {
                    let xml = response
                        .text()
                        .await
                        .map_err(|e| StorageError::ParseError(e.to_string()))?;

                    let (entries, next_token) = parse_list_response(&xml)?;
                    all_entries.extend(entries);

                    match next_token {
                        Some(token) => continuation_token = Some(token),
                        None => break,
                    }
                }
                StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => {
                    return Err(StorageError::AuthenticationFailed(format!(
                        "cannot list {}", bucket
                    )));
                }
                StatusCode::NOT_FOUND => {
                    return Err(StorageError::NotFound(format!("bucket '{}'", bucket)));
                }
                status => {
                    return Err(StorageError::ServerError(format!(
                        "list failed with status: {}", status
                    )));
                }
            }
        }

        Ok(all_entries)
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        debug!(bucket, key, "get object");

        let response = self.s3_request(Method::GET, bucket, key, None).await?;

        match response.status() {
            StatusCode::OK => {
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| StorageError::NetworkError(e.to_string()))?;
                Ok(bytes.to_vec())
            }
            StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => Err(
                StorageError::AuthenticationFailed(format!("cannot read {}/{}", bucket, key)),
            ),
            StatusCode::NOT_FOUND => Err(StorageError::NotFound(format!("{}/{}", bucket, key))),
            status => Err(StorageError::ServerError(format!(
                "get failed with status: {}", status
            ))),
        }
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        let expires = expires_in.as_secs().max(1);

        let now: DateTime<Utc> = Utc::now();
        let date_stamp = now.format("%Y%m%d").to_string();
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();

        let credential_scope = format!("{}/{}/s3/aws4_request", date_stamp, self.config.region);
        let credential = format!("{}/{}", self.config.access_key_id, credential_scope);

        let url = self.build_url(bucket, key);
        let parsed = url::Url::parse(&url)
            .map_err(|e| StorageError::InvalidConfig(e.to_string()))?;

        let host = parsed.host_str().unwrap_or("");
        let path_part = parsed.path();

        // Canonical query string: parameters already in byte-sorted order.
        let signed_headers = "host";
        let query_params = format!(
            "X-Amz-Algorithm=AWS4-HMAC-SHA256&X-Amz-Credential={}&X-Amz-Date={}&X-Amz-Expires={}&X-Amz-SignedHeaders={}",
            urlencoding::encode(&credential),
            amz_date,
            expires,
            signed_headers
        );

        let canonical_request = format!(
            "GET\n{}\n{}\nhost:{}\n\n{}\nUNSIGNED-PAYLOAD",
            path_part, query_params, host, signed_headers
        );

        let canonical_hash = hex::encode(Sha256::digest(canonical_request.as_bytes()));

        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{}\n{}\n{}",
            amz_date, credential_scope, canonical_hash
        );

        let signature = hex::encode(self.derive_signature(&date_stamp, &string_to_sign));

        Ok(format!("{}?{}&X-Amz-Signature={}", url, query_params, signature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn test_client(endpoint: Option<&str>, path_style: bool) -> S3Client {
        S3Client::new(S3ClientConfig {
            endpoint: endpoint.map(|e| e.to_string()),
            region: "us-east-2".to_string(),
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: SecretString::from("secret".to_string()),
            path_style,
            timeout_secs: 5,
        })
        .expect("client")
    }

    #[test]
    fn test_build_url_path_style() {
        let client = test_client(Some("http://localhost:9000"), true);
        assert_eq!(
            client.build_url("test-bucket", "path/to/file.txt"),
            "http://localhost:9000/test-bucket/path/to/file.txt"
        );
    }

    #[test]
    fn test_build_url_virtual_hosted() {
        let client = test_client(None, false);
        assert_eq!(
            client.build_url("my-bucket", "path/to/file.txt"),
            "https://my-bucket.s3.us-east-2.amazonaws.com/path/to/file.txt"
        );
    }

    #[test]
    fn test_build_url_encodes_key_segments() {
        let client = test_client(None, false);
        assert_eq!(
            client.build_url("b", "dir/program notes.pdf"),
            "https://b.s3.us-east-2.amazonaws.com/dir/program%20notes.pdf"
        );
    }

    #[test]
    fn test_parse_list_response() {
        let xml = r#"<?xml version="1.0"?>
<ListBucketResult>
  <Contents><Key>some/dir/</Key><Size>0</Size></Contents>
  <Contents><Key>index.html</Key><Size>64</Size></Contents>
  <Contents><Key>some/dir/file.txt</Key><Size>128</Size></Contents>
</ListBucketResult>"#;
        let (entries, token) = parse_list_response(xml).expect("parse");
        assert_eq!(token, None);
        assert_eq!(
            entries,
            vec![
                ObjectEntry::new("some/dir/", 0),
                ObjectEntry::new("index.html", 64),
                ObjectEntry::new("some/dir/file.txt", 128),
            ]
        );
    }

    #[test]
    fn test_parse_list_response_continuation() {
        let xml = "<ListBucketResult><NextContinuationToken>abc123</NextContinuationToken></ListBucketResult>";
        let (entries, token) = parse_list_response(xml).expect("parse");
        assert!(entries.is_empty());
        assert_eq!(token, Some("abc123".to_string()));
    }

    #[tokio::test]
    async fn test_presign_get_shape() {
        let client = test_client(None, false);
        let url = client
            .presign_get("my-bucket", "docs/file.pdf", Duration::from_secs(1200))
            .await
            .expect("presign");

        assert!(url.starts_with("https://my-bucket.s3.us-east-2.amazonaws.com/docs/file.pdf?"));
        assert!(url.contains("X-Amz-Algorithm=AWS4-HMAC-SHA256"));
        assert!(url.contains("X-Amz-Expires=1200"));
        assert!(url.contains("X-Amz-SignedHeaders=host"));
        assert!(url.contains("X-Amz-Signature="));
        assert!(url.contains(&urlencoding::encode("AKIDEXAMPLE/").into_owned()));
    }
}
