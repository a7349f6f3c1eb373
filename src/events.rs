// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

//! Provisioning events.
//!
//! Derived state (default role grants, organization role grants, the baseline
//! environment of a personal organization) is built by collaborators reacting
//! to the events published here once the primary store is durable.

use async_trait::async_trait;
#[cfg(test)]
use mockall::mock;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProvisioningEvent {
    /// New user was registered
    UserProvisioned { user_id: i32 },

    /// Personal organization was created for the new user
    PersonalOrganizationCreated { organization_id: i32, name: String },

    /// Organization set of the user was synchronized
    OrganizationsChanged {
        user_id: i32,
        organization_ids: Vec<i32>,
    },
}

#[derive(Error, Debug)]
pub enum EventError {
    #[error("event sink is closed")]
    Closed,

    #[error("publishing event failed: {0}")]
    Publish(String),
}

#[async_trait]
pub trait EventSink: Send + Sync + Debug {
    async fn publish(&self, event: ProvisioningEvent) -> Result<(), EventError>;
}

#[cfg(test)]
mock! {
    #[derive(Debug)]
    pub EventSink {}

    #[async_trait]
    impl EventSink for EventSink {
        async fn publish(&self, event: ProvisioningEvent) -> Result<(), EventError>;
    }
}

/// In-process sink forwarding the events to a tokio channel.
#[derive(Clone, Debug)]
pub struct ChannelEventSink {
    sender: mpsc::UnboundedSender<ProvisioningEvent>,
}

impl ChannelEventSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProvisioningEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl EventSink for ChannelEventSink {
    async fn publish(&self, event: ProvisioningEvent) -> Result<(), EventError> {
        self.sender.send(event).map_err(|_| EventError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_sink_as_trait_object() {
        let sink: Arc<dyn EventSink> = Arc::new(MockEventSink::new());
        assert_eq!("MockEventSink", format!("{sink:?}"));
    }

    #[tokio::test]
    async fn test_channel_sink() {
        let (sink, mut events) = ChannelEventSink::new();
        sink.publish(ProvisioningEvent::UserProvisioned { user_id: 1 })
            .await
            .unwrap();
        assert_eq!(
            Some(ProvisioningEvent::UserProvisioned { user_id: 1 }),
            events.recv().await
        );

        drop(events);
        assert!(matches!(
            sink.publish(ProvisioningEvent::UserProvisioned { user_id: 2 })
                .await,
            Err(EventError::Closed)
        ));
    }

    #[test]
    fn test_wire_format() {
        assert_eq!(
            serde_json::json!({"event": "organizations_changed", "user_id": 1, "organization_ids": [5, 7]}),
            serde_json::to_value(ProvisioningEvent::OrganizationsChanged {
                user_id: 1,
                organization_ids: vec![5, 7],
            })
            .unwrap()
        );
    }
}
