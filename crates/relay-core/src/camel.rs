//! lowerCamelCase normalization used when matching filter keys against
//! publisher-supplied attribute keys (see the matching-engine section of the
//! spec: publishers send camelCase, stored filter keys are historically
//! snake_case).

/// Converts `snake_case` or already-`camelCase` input to lowerCamelCase.
///
/// `"vertrouwelijkheidaanduiding"` and `"some_key"` both come out as
/// `"someKey"` / unchanged; this is idempotent on already-camelCase input.
pub fn to_lower_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper_next = false;
    for (i, ch) in s.chars().enumerate() {
        if ch == '_' {
            upper_next = true;
            continue;
        }
        if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else if i == 0 {
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
