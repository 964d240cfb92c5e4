//! Google Cloud Vision (v1 REST) text detection
//!
//! Reads signage from a photo. When the sign looks like subway signage only
//! Hangul and digits are kept from every word; otherwise the dominant text
//! boxes by area are chosen and read left to right.

use crate::runtime::{DetectionError, TextDetector};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://vision.googleapis.com";

/// Words that mark an image as subway signage
const TRANSIT_TERMS: [&str; 3] = ["호선", "출입구", "지하철"];
const STATION_SUFFIX: &str = "역";
/// Boxes kept when no single box dominates
const TOP_BOXES: usize = 3;
/// Area ratio at which the largest box is read alone
const DOMINANCE_RATIO: f64 = 2.0;

pub struct GoogleVisionDetector {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
}

impl GoogleVisionDetector {
    pub fn new(api_key: Option<String>, base_url: Option<&str>) -> Self {
        let endpoint = format!(
            "{}/v1/images:annotate",
            base_url.unwrap_or(DEFAULT_BASE_URL).trim_end_matches('/')
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key,
            endpoint,
        }
    }
}

fn annotate_request(image: &[u8]) -> AnnotateRequest {
    AnnotateRequest {
        requests: vec![AnnotateImageRequest {
            image: ImageContent {
                content: STANDARD.encode(image),
            },
            features: vec![Feature {
                kind: "TEXT_DETECTION",
            }],
        }],
    }
}

// ============================================================================
// Text selection
// ============================================================================

/// Pick the destination-relevant text out of Vision's annotations.
///
/// The first annotation is the whole detected text; the rest are individual
/// words with bounding boxes.
fn select_text(annotations: &[TextAnnotation]) -> String {
    let Some((_, words)) = annotations.split_first() else {
        return String::new();
    };

    if annotations.iter().any(TextAnnotation::is_transit_marker) {
        return words
            .iter()
            .map(|word| hangul_and_digits(&word.description))
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
    }

    let mut by_area: Vec<&TextAnnotation> = words.iter().collect();
    by_area.sort_by(|a, b| b.area().total_cmp(&a.area()));

    let largest = by_area.first().map_or(0.0, |a| a.area());
    let second = by_area.get(1).map_or(0.0, |a| a.area());
    let keep = if second > 0.0 && largest / second > DOMINANCE_RATIO {
        1
    } else {
        TOP_BOXES
    };
    by_area.truncate(keep);
    by_area.sort_by(|a, b| {
        a.left()
            .total_cmp(&b.left())
            .then_with(|| a.top().total_cmp(&b.top()))
    });

    let mut seen: Vec<String> = Vec::new();
    for annotation in by_area {
        for word in strip_symbols(&annotation.description).split_whitespace() {
            if !seen.iter().any(|w| w == word) {
                seen.push(word.to_string());
            }
        }
    }
    seen.join(" ")
}

fn is_hangul_syllable(c: char) -> bool {
    ('가'..='힣').contains(&c)
}

fn hangul_and_digits(text: &str) -> String {
    text.chars()
        .filter(|&c| is_hangul_syllable(c) || c.is_ascii_digit() || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

fn strip_symbols(text: &str) -> String {
    text.chars()
        .filter(|&c| is_hangul_syllable(c) || c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

#[async_trait]
impl TextDetector for GoogleVisionDetector {
    async fn detect_text(&self, image: &[u8]) -> Result<String, DetectionError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(DetectionError::NotConfigured)?;

        let start = std::time::Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .json(&annotate_request(image))
            .send()
            .await
            .map_err(|e| DetectionError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DetectionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: AnnotateResponse = response
            .json()
            .await
            .map_err(|e| DetectionError::InvalidResponse(e.to_string()))?;
        let result = parsed.responses.into_iter().next().unwrap_or_default();
        if let Some(error) = result.error {
            return Err(DetectionError::InvalidResponse(error.message));
        }

        let text = select_text(&result.text_annotations);
        tracing::info!(
            image_bytes = image.len(),
            annotations = result.text_annotations.len(),
            duration_ms = %start.elapsed().as_millis(),
            empty = text.is_empty(),
            "Text detected"
        );
        Ok(text)
    }
}

// Vision API types

#[derive(Debug, Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Serialize)]
struct AnnotateImageRequest {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Debug, Serialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageAnnotations>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageAnnotations {
    #[serde(default)]
    text_annotations: Vec<TextAnnotation>,
    error: Option<ApiStatus>,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextAnnotation {
    #[serde(default)]
    description: String,
    #[serde(default)]
    bounding_poly: BoundingPoly,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct BoundingPoly {
    #[serde(default)]
    vertices: Vec<Vertex>,
}

/// Vision omits zero coordinates
#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct Vertex {
    #[serde(default)]
    x: i32,
    #[serde(default)]
    y: i32,
}

impl TextAnnotation {
    fn is_transit_marker(&self) -> bool {
        TRANSIT_TERMS.contains(&self.description.as_str())
            || self.description.ends_with(STATION_SUFFIX)
    }

    /// Box area from opposite corners; zero for a degenerate polygon
    fn area(&self) -> f64 {
        match self.bounding_poly.vertices.as_slice() {
            [first, _, third, _, ..] => {
                (f64::from(third.x - first.x) * f64::from(third.y - first.y)).abs()
            }
            _ => 0.0,
        }
    }

    fn left(&self) -> f64 {
        self.bounding_poly
            .vertices
            .iter()
            .map(|v| f64::from(v.x))
            .reduce(f64::min)
            .unwrap_or_default()
    }

    fn top(&self) -> f64 {
        self.bounding_poly
            .vertices
            .iter()
            .map(|v| f64::from(v.y))
            .reduce(f64::min)
            .unwrap_or_default()
    }
}
