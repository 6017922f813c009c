use super::FrameConverter;
use crate::error::{AccessError, Result};
use crate::grpc::{convert, proto};
use crate::model::{BlockEvents, ExecutionDataStreamResponse, Identifier};
use crate::payload::EventEncodingVersion;

/// Converts execution data frames, decoding event payloads with `encoding`.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionDataConverter {
    pub encoding: EventEncodingVersion,
}

impl FrameConverter for ExecutionDataConverter {
    type Frame = proto::SubscribeExecutionDataResponse;
    type Value = ExecutionDataStreamResponse;

    fn convert(&self, frame: Self::Frame) -> Result<Self::Value> {
        let data = frame.block_execution_data.ok_or_else(|| {
            AccessError::MalformedFrame(format!(
                "execution data frame at height {} carries no block execution data",
                frame.block_height
            ))
        })?;

        Ok(ExecutionDataStreamResponse {
            height: frame.block_height,
            execution_data: convert::execution_data_from_proto(data, self.encoding)?,
            block_timestamp: convert::timestamp_to_datetime(frame.block_timestamp.as_ref()),
        })
    }
}

/// Converts event frames. One undecodable payload rejects the whole frame.
#[derive(Debug, Clone, Copy)]
pub struct EventsConverter {
    pub encoding: EventEncodingVersion,
}

impl FrameConverter for EventsConverter {
    type Frame = proto::SubscribeEventsResponse;
    type Value = BlockEvents;

    fn convert(&self, frame: Self::Frame) -> Result<Self::Value> {
        Ok(BlockEvents {
            block_id: Identifier::from_slice(&frame.block_id),
            height: frame.block_height,
            block_timestamp: convert::timestamp_to_datetime(frame.block_timestamp.as_ref()),
            events: convert::events_from_proto(frame.events, self.encoding)?,
        })
    }
}
