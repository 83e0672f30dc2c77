//! Broadcast update unit

use std::sync::Arc;

use bytes::Bytes;

use crate::model::VehicleSnapshot;

/// A snapshot queued for delivery to subscribers
///
/// Cheap to clone: the snapshot sits behind an `Arc` and the payload is
/// reference-counted `Bytes`. The payload is the snapshot encoded as JSON,
/// produced once per publish regardless of subscriber count.
#[derive(Debug, Clone)]
pub struct VehicleUpdate {
    /// The decoded snapshot
    pub snapshot: Arc<VehicleSnapshot>,

    /// JSON encoding of the snapshot, shared across all subscriber queues
    pub payload: Bytes,
}

impl VehicleUpdate {
    /// Encode a snapshot for broadcast
    pub fn new(snapshot: VehicleSnapshot) -> Result<Self, serde_json::Error> {
        let payload = Bytes::from(serde_json::to_vec(&snapshot)?);
        Ok(Self {
            snapshot: Arc::new(snapshot),
            payload,
        })
    }

    /// Payload as owned text for a websocket text frame
    pub fn payload_text(&self) -> String {
        // serde_json output is always valid UTF-8
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DriveStatus, VehicleState};

    fn snapshot() -> VehicleSnapshot {
        VehicleSnapshot::single(VehicleState {
            device_id: "dev-1".into(),
            display_name: "Truck 1".into(),
            online: true,
            position: None,
            drive_status: DriveStatus::Idle,
        })
    }

    #[test]
    fn test_clone_shares_payload() {
        let update = VehicleUpdate::new(snapshot()).unwrap();
        let copy = update.clone();

        // Bytes clones point at the same allocation
        assert_eq!(update.payload.as_ptr(), copy.payload.as_ptr());
        assert!(Arc::ptr_eq(&update.snapshot, &copy.snapshot));
    }

    #[test]
    fn test_payload_round_trips() {
        let update = VehicleUpdate::new(snapshot()).unwrap();
        let decoded: VehicleSnapshot = serde_json::from_slice(&update.payload).unwrap();

        assert_eq!(decoded, *update.snapshot);
    }

    #[test]
    fn test_payload_text_is_json() {
        let update = VehicleUpdate::new(snapshot()).unwrap();
        let text = update.payload_text();

        assert!(text.starts_with('{'));
        assert!(text.contains("\"device_id\":\"dev-1\""));
    }
}
