// Copyright 2026 Muvon Un Limited
//
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

pub mod dispatcher;
pub mod error;
pub mod health;
pub mod normalize;
pub mod payload;
pub mod transport;
pub mod types;

mod normalize_tests;

pub use dispatcher::{Dispatcher, HealthPolicy};
pub use error::DispatchError;
pub use health::{EndpointHealth, HealthRegistry, HealthResetTask};
pub use transport::{HttpTransport, Transport};
pub use types::{Endpoint, EndpointRole, GeoLocation, NormalizedResponse, Query, Resource, Turn};
