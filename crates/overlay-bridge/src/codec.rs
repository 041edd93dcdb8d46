//! Wire format spoken on the host channel.
//!
//! Messages flow in both directions, one JSON document per message:
//! - **Host -> overlay**: `{"action": "sendAlert", "data": {...}}` pushes an
//!   event; `{"id": "0a1b2c3d", "ok": true, "data": ...}` answers a call.
//! - **Overlay -> host**: `{"id": "0a1b2c3d", "endpoint": "closeAlert", "body": "confirm"}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use overlay_common::{BridgeError, CorrelationId, InboundEvent, OutboundCall};

/// The host's answer to an outbound call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostResponse {
    pub id: CorrelationId,
    pub ok: bool,
    #[serde(default)]
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HostResponse {
    pub fn ok(id: CorrelationId, data: Value) -> Self {
        Self {
            id,
            ok: true,
            data,
            error: None,
        }
    }

    pub fn err(id: CorrelationId, reason: impl Into<String>) -> Self {
        Self {
            id,
            ok: false,
            data: Value::Null,
            error: Some(reason.into()),
        }
    }

    /// Resolve into the call result seen by the caller of `endpoint`.
    pub fn into_result(self, endpoint: &str) -> Result<Value, BridgeError> {
        if self.ok {
            Ok(self.data)
        } else {
            Err(BridgeError::Rejected {
                endpoint: endpoint.to_string(),
                reason: self.error.unwrap_or_else(|| "unspecified".to_string()),
            })
        }
    }
}

/// Anything the host may send.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum HostFrame {
    Event(InboundEvent),
    Response(HostResponse),
}

impl HostFrame {
    /// Parse one host message.
    pub fn from_json(raw: &str) -> Result<Self, BridgeError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Encode an outbound call as a single line of JSON.
pub fn encode_call(call: &OutboundCall) -> Result<String, BridgeError> {
    Ok(serde_json::to_string(call)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_event_frame() {
        let frame = HostFrame::from_json(r#"{"action":"progress","data":{"duration":500,"label":"Eating"}}"#)
            .unwrap();
        match frame {
            HostFrame::Event(event) => {
                assert_eq!(event.name, "progress");
                assert_eq!(event.payload["duration"], 500);
            }
            other => panic!("expected event, got {other:?}"),
        }
    }

    #[test]
    fn parses_response_frame() {
        let frame = HostFrame::from_json(r#"{"id":"deadbeef","ok":true,"data":{"accepted":true}}"#)
            .unwrap();
        match frame {
            HostFrame::Response(resp) => {
                assert_eq!(resp.id.as_str(), "deadbeef");
                assert_eq!(resp.into_result("closeAlert").unwrap(), json!({"accepted": true}));
            }
            other => panic!("expected response, got {other:?}"),
        }
    }

    #[test]
    fn rejected_response_maps_to_error() {
        let frame = HostFrame::from_json(r#"{"id":"deadbeef","ok":false,"error":"no handler"}"#)
            .unwrap();
        let HostFrame::Response(resp) = frame else {
            panic!("expected response");
        };
        let err = resp.into_result("inputData").unwrap_err();
        assert!(matches!(err, BridgeError::Rejected { ref reason, .. } if reason == "no handler"));
    }

    #[test]
    fn garbage_is_a_codec_error() {
        assert!(matches!(
            HostFrame::from_json("not json"),
            Err(BridgeError::Codec(_))
        ));
        assert!(matches!(
            HostFrame::from_json(r#"{"hello":"world"}"#),
            Err(BridgeError::Codec(_))
        ));
    }

    #[test]
    fn encodes_call_on_one_line() {
        let call = OutboundCall {
            id: CorrelationId::from("0a1b2c3d"),
            endpoint: "closeAlert".into(),
            body: Some(json!("confirm")),
        };
        let line = encode_call(&call).unwrap();
        assert!(!line.contains('\n'));
        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(
            value,
            json!({"id": "0a1b2c3d", "endpoint": "closeAlert", "body": "confirm"})
        );
    }
}
