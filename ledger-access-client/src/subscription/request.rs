use crate::error::{AccessError, Result};
use crate::model::{Address, EventFilter, Identifier, ADDRESS_LEN};
use crate::payload::EventEncodingVersion;

/// Heartbeat interval sent when the caller does not choose one.
pub const DEFAULT_HEARTBEAT_INTERVAL: u64 = 100;
/// Value channel capacity used when the caller does not choose one.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 20;

/// Where a subscription starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubscriptionAnchor {
    /// Leave the starting point to the server, which starts at the latest block.
    #[default]
    Latest,
    Height(u64),
    BlockId(Identifier),
}

impl SubscriptionAnchor {
    /// Builds an anchor from the zero-value-means-unset pair used by the
    /// subscribe entry points.
    ///
    /// Supplying both a non-empty block id and a non-zero height is rejected.
    pub fn from_parts(start_block_id: Identifier, start_height: u64) -> Result<Self> {
        match (start_block_id.is_empty(), start_height) {
            (true, 0) => Ok(SubscriptionAnchor::Latest),
            (true, height) => Ok(SubscriptionAnchor::Height(height)),
            (false, 0) => Ok(SubscriptionAnchor::BlockId(start_block_id)),
            (false, _) => Err(AccessError::InvalidArgument(
                "only one of start block ID and start height may be provided".to_string(),
            )),
        }
    }

    pub fn start_block_id(&self) -> Option<&Identifier> {
        match self {
            SubscriptionAnchor::BlockId(id) => Some(id),
            _ => None,
        }
    }

    pub fn start_height(&self) -> Option<u64> {
        match self {
            SubscriptionAnchor::Height(height) => Some(*height),
            _ => None,
        }
    }
}

/// Optional settings of a subscribe call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscribeOptions {
    /// Number of blocks without matching events after which the server sends
    /// an empty heartbeat frame. Zero selects the server default.
    pub heartbeat_interval: u64,
    pub event_encoding: EventEncodingVersion,
    pub channel_capacity: usize,
}

impl Default for SubscribeOptions {
    fn default() -> Self {
        Self {
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            event_encoding: EventEncodingVersion::default(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl SubscribeOptions {
    pub fn with_heartbeat_interval(mut self, interval: u64) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    pub fn with_event_encoding(mut self, encoding: EventEncodingVersion) -> Self {
        self.event_encoding = encoding;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }
}

/// A validated execution data subscription request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionDataRequest {
    pub anchor: SubscriptionAnchor,
    pub event_encoding: EventEncodingVersion,
}

impl ExecutionDataRequest {
    pub fn new(
        start_block_id: Identifier,
        start_height: u64,
        options: &SubscribeOptions,
    ) -> Result<Self> {
        Ok(Self {
            anchor: SubscriptionAnchor::from_parts(start_block_id, start_height)?,
            event_encoding: options.event_encoding,
        })
    }
}

/// A validated event subscription request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventsRequest {
    pub anchor: SubscriptionAnchor,
    pub filter: EventFilter,
    pub heartbeat_interval: u64,
    pub event_encoding: EventEncodingVersion,
}

impl EventsRequest {
    pub fn new(
        start_block_id: Identifier,
        start_height: u64,
        filter: EventFilter,
        options: &SubscribeOptions,
    ) -> Result<Self> {
        Ok(Self {
            anchor: SubscriptionAnchor::from_parts(start_block_id, start_height)?,
            filter: normalize_filter(filter)?,
            heartbeat_interval: options.heartbeat_interval,
            event_encoding: options.event_encoding,
        })
    }
}

/// Drops blank entries so that a filter of empty strings matches everything
/// instead of nothing, and rejects addresses that are not valid hex.
fn normalize_filter(filter: EventFilter) -> Result<EventFilter> {
    let keep = |values: Vec<String>| -> Vec<String> {
        values
            .into_iter()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect()
    };
    let addresses = keep(filter.addresses);
    for address in &addresses {
        let digits = address.strip_prefix("0x").unwrap_or(address);
        if digits.len() > 2 * ADDRESS_LEN {
            return Err(AccessError::InvalidArgument(format!(
                "filter address '{address}' is longer than {ADDRESS_LEN} bytes"
            )));
        }
        Address::from_hex(address).map_err(|e| {
            AccessError::InvalidArgument(format!("malformed filter address: {e}"))
        })?;
    }
    Ok(EventFilter {
        event_types: keep(filter.event_types),
        addresses,
        contracts: keep(filter.contracts),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some_id() -> Identifier {
        Identifier::from_slice(&[7; 32])
    }

    #[test]
    fn anchor_is_exclusive() {
        assert_eq!(
            SubscriptionAnchor::from_parts(Identifier::EMPTY, 0).unwrap(),
            SubscriptionAnchor::Latest
        );
        assert_eq!(
            SubscriptionAnchor::from_parts(Identifier::EMPTY, 10).unwrap(),
            SubscriptionAnchor::Height(10)
        );
        assert_eq!(
            SubscriptionAnchor::from_parts(some_id(), 0).unwrap(),
            SubscriptionAnchor::BlockId(some_id())
        );
        assert!(matches!(
            SubscriptionAnchor::from_parts(some_id(), 10),
            Err(AccessError::InvalidArgument(_))
        ));
    }

    #[test]
    fn options_default_to_ccf_and_heartbeat_100() {
        let options = SubscribeOptions::default();
        assert_eq!(options.heartbeat_interval, 100);
        assert_eq!(options.event_encoding, EventEncodingVersion::CcfV0);

        let options = options
            .with_heartbeat_interval(1234)
            .with_event_encoding(EventEncodingVersion::JsonCdcV0);
        assert_eq!(options.heartbeat_interval, 1234);
        assert_eq!(options.event_encoding, EventEncodingVersion::JsonCdcV0);
    }

    #[test]
    fn blank_filter_entries_are_dropped() {
        let request = EventsRequest::new(
            Identifier::EMPTY,
            5,
            EventFilter {
                event_types: vec!["".into(), " A.1.Foo.Bar ".into()],
                addresses: vec!["  ".into()],
                contracts: vec![],
            },
            &SubscribeOptions::default(),
        )
        .unwrap();

        assert_eq!(request.filter.event_types, vec!["A.1.Foo.Bar".to_string()]);
        assert!(request.filter.addresses.is_empty());
        assert_eq!(request.anchor, SubscriptionAnchor::Height(5));
    }

    #[test]
    fn malformed_filter_address_is_rejected() {
        let filter_with = |address: &str| EventFilter {
            addresses: vec![address.to_string()],
            ..Default::default()
        };
        let options = SubscribeOptions::default();

        for bad in ["zz-not-hex", "0x0x01", "0x000000000000000001"] {
            let err = EventsRequest::new(Identifier::EMPTY, 0, filter_with(bad), &options)
                .unwrap_err();
            assert!(matches!(err, AccessError::InvalidArgument(_)), "{bad}");
        }

        let request =
            EventsRequest::new(Identifier::EMPTY, 0, filter_with(" 0x01 "), &options).unwrap();
        assert_eq!(request.filter.addresses, vec!["0x01".to_string()]);
    }
}
