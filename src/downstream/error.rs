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

use thiserror::Error;

use crate::credential::CredentialError;
use crate::downstream::backends::error::MirrorDatabaseError;

#[derive(Error, Debug)]
pub enum DownstreamError {
    /// Unsupported driver
    #[error("unsupported driver {0}")]
    UnsupportedDriver(String),

    /// Downstream store write or read failed
    #[error("mirroring the user into the downstream store failed")]
    Mirror {
        #[from]
        source: MirrorDatabaseError,
    },

    /// Repository pre-warm request failed
    #[error("downstream repository refresh failed")]
    Prewarm {
        #[from]
        source: reqwest::Error,
    },

    #[error("downstream credential")]
    Credential {
        #[from]
        source: CredentialError,
    },

    #[error("downstream {0} is not configured")]
    NotConfigured(&'static str),

    /// Reconciler is not running anymore
    #[error("mirror reconciliation queue is closed")]
    QueueClosed,

    #[error("mirror reconciliation queue is full, dropped the job of {0}")]
    QueueFull(String),
}
