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

//! Identity federation for the Pipeline platform.
//!
//! A freshly authenticated external identity is turned into a platform user
//! with a personal organization, its externally known organizations and roles
//! are mirrored into the primary store, and a copy of the user is provisioned
//! in the downstream CI system's own store.

pub mod config;
pub mod credential;
pub mod db;
pub mod downstream;
pub mod error;
pub mod events;
pub mod external;
pub mod federation;
pub mod identity;
pub mod organization;
pub mod plugin_manager;
pub mod principal;
pub mod provider;
pub mod service;
