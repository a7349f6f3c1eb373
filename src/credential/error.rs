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

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("signing key is not configured")]
    MissingSecret,

    #[error("credential can not be signed")]
    Encode {
        #[source]
        source: jsonwebtoken::errors::Error,
    },

    #[error("credential expired")]
    Expired,

    #[error("invalid credential: {0}")]
    Invalid(String),
}
