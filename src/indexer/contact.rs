use serde_json::Value;

/// Turns contact points into searchable text.
///
/// A contact point looks like
/// `{"name": "...", "phone": ["030 1234"], "email": ["a@b.de"],
///   "addresses": [{"street": "...", "postalCode": "...", "city": "...", "country": "..."}]}`.
/// Phone numbers are indexed with and without their trunk prefix so that
/// `030 1234` and `30 1234` both match.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactPointTransformer;

impl ContactPointTransformer {
    pub fn new() -> Self {
        ContactPointTransformer
    }

    pub fn transform(&self, contact_points: &[&Value]) -> String {
        let mut parts: Vec<String> = Vec::new();
        for point in contact_points {
            let Some(point) = point.as_object() else {
                continue;
            };
            if let Some(name) = point.get("name").and_then(Value::as_str) {
                parts.push(name.to_string());
            }
            for phone in strings(point.get("phone")) {
                parts.extend(phone_variants(&phone));
            }
            parts.extend(strings(point.get("email")));
            if let Some(Value::Array(addresses)) = point.get("addresses") {
                for address in addresses {
                    parts.extend(address_lines(address));
                }
            }
        }
        parts
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn strings(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// `+49 (0)30 1234` → `+49 (0)30 1234`, `+49 30 1234`, `030 1234`;
/// `030 1234` → `030 1234`, `30 1234`.
fn phone_variants(phone: &str) -> Vec<String> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Vec::new();
    }
    let mut variants = vec![phone.to_string()];
    if let Some((country, national)) = phone.split_once("(0)") {
        let national = national.trim();
        variants.push(format!("{} {}", country.trim(), national));
        variants.push(format!("0{}", national));
    } else if let Some(rest) = phone.strip_prefix('0') {
        variants.push(rest.to_string());
    } else if !phone.starts_with('+') {
        variants.push(format!("0{}", phone));
    }
    variants
}

fn address_lines(address: &Value) -> Vec<String> {
    let Some(address) = address.as_object() else {
        return Vec::new();
    };
    let field = |name: &str| {
        address
            .get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default()
    };
    let city_line = [field("postalCode"), field("city")]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    [field("street").to_string(), city_line, field("country").to_string()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect()
}
