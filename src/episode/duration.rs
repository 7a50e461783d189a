// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::error::DurationError;

/// Seconds per unit, from the rightmost component leftwards
const UNIT_SECONDS: [u64; 3] = [1, 60, 3600];

/// Normalize an episode duration to whole seconds
///
/// Accepts `hh:mm:ss`, `mm:ss` or plain seconds. Components are read
/// right-to-left as seconds, minutes and hours.
pub fn parse_duration(raw: &str) -> Result<u64, DurationError> {
    let components: Vec<&str> = raw.split(':').collect();

    if components.len() > UNIT_SECONDS.len() {
        return Err(DurationError::TooManyComponents {
            raw: raw.to_string(),
        });
    }

    components
        .iter()
        .rev()
        .zip(UNIT_SECONDS)
        .try_fold(0u64, |total, (component, unit)| {
            let value: u64 =
                component
                    .trim()
                    .parse()
                    .map_err(|_| DurationError::InvalidComponent {
                        raw: raw.to_string(),
                        component: component.to_string(),
                    })?;
            value
                .checked_mul(unit)
                .and_then(|seconds| total.checked_add(seconds))
                .ok_or_else(|| DurationError::Overflow {
                    raw: raw.to_string(),
                })
        })
}
