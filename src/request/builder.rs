use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::Result;

use super::TemplateRequest;

/// Wire shape of a request. Field order is the serialization order.
#[derive(Serialize)]
struct WireRequest<'a> {
    template: &'a str,
    params: &'a BTreeMap<String, String>,
}

/// Serialize a request into its canonical payload.
///
/// Output is compact JSON with `template` first and params sorted by key,
/// so equal inputs always produce identical bytes.
pub fn build(request: &TemplateRequest) -> Result<Vec<u8>> {
    let params = request.params();
    let wire = WireRequest {
        template: request.template(),
        params: &params,
    };
    Ok(serde_json::to_vec(&wire)?)
}
