use crate::telemetry::sample::Sample;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A reading as the simulation driver posts it.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SamplePacket {
    pub time: f64,
    pub value: f64,
}

/// Request bodies may carry one packet or a batch of them.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum SampleBatch {
    One(SamplePacket),
    Many(Vec<SamplePacket>),
}

#[derive(Debug, Error, PartialEq)]
pub enum PacketError {
    #[error("sample #{index} has a non-finite time ({time})")]
    BadTime { index: usize, time: f64 },
    #[error("sample #{index} has a non-finite value ({value})")]
    BadValue { index: usize, value: f64 },
}

impl TryFrom<&SamplePacket> for Sample {
    type Error = PacketError;

    fn try_from(packet: &SamplePacket) -> Result<Self, Self::Error> {
        match (packet.time.is_finite(), packet.value.is_finite()) {
            (false, _) => Err(PacketError::BadTime {
                index: 0,
                time: packet.time,
            }),
            (_, false) => Err(PacketError::BadValue {
                index: 0,
                value: packet.value,
            }),
            (true, true) => Ok(Sample::new(packet.time, packet.value)),
        }
    }
}

impl SampleBatch {
    /// Validates every packet; a single bad packet rejects the whole batch.
    pub fn into_samples(self) -> Result<Vec<Sample>, PacketError> {
        let packets = match self {
            SampleBatch::One(packet) => vec![packet],
            SampleBatch::Many(packets) => packets,
        };

        packets
            .iter()
            .enumerate()
            .map(|(index, packet)| {
                Sample::try_from(packet).map_err(|err| match err {
                    PacketError::BadTime { time, .. } => PacketError::BadTime { index, time },
                    PacketError::BadValue { value, .. } => PacketError::BadValue { index, value },
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_single_and_batched_bodies() {
        let one: SampleBatch = serde_json::from_str(r#"{"time": 1.5, "value": 3.0}"#).unwrap();
        assert_eq!(one.into_samples().unwrap(), vec![Sample::new(1.5, 3.0)]);

        let many: SampleBatch =
            serde_json::from_str(r#"[{"time": 0, "value": 1}, {"time": 2, "value": -4.5}]"#).unwrap();
        assert_eq!(
            many.into_samples().unwrap(),
            vec![Sample::new(0.0, 1.0), Sample::new(2.0, -4.5)]
        );
    }

    #[test]
    fn rejects_non_finite_packets_with_their_position() {
        let batch = SampleBatch::Many(vec![
            SamplePacket { time: 0.0, value: 1.0 },
            SamplePacket { time: 1.0, value: f64::INFINITY },
        ]);
        assert_eq!(
            batch.into_samples(),
            Err(PacketError::BadValue {
                index: 1,
                value: f64::INFINITY
            })
        );

        let bad_time = SamplePacket { time: f64::NAN, value: 0.0 };
        assert!(matches!(Sample::try_from(&bad_time), Err(PacketError::BadTime { .. })));
    }
}
