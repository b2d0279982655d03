use chrono::{DateTime, Duration, Utc};

use super::ChannelError;

/// `count` evenly spaced timestamps from `start` to `end`, both included.
pub fn linspace(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    count: usize,
) -> Result<Vec<DateTime<Utc>>, ChannelError> {
    if count == 0 {
        return Err(ChannelError::EmptySeries);
    }
    if end < start {
        return Err(ChannelError::InvalidWindow(format!(
            "end {} is before start {}",
            end, start
        )));
    }
    if count == 1 {
        return Ok(vec![start]);
    }
    if end == start {
        return Err(ChannelError::InvalidWindow(format!(
            "{} samples requested in an empty window at {}",
            count, start
        )));
    }

    let span_ns = (end - start)
        .num_nanoseconds()
        .ok_or_else(|| ChannelError::InvalidWindow("window too long".into()))?
        as i128;
    let last = (count - 1) as i128;

    Ok((0..count)
        .map(|k| start + Duration::nanoseconds((span_ns * k as i128 / last) as i64))
        .collect())
}

/// Timestamps from `start` every `step` up to and including `end`.
pub fn stepped(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    step: Duration,
) -> Result<Vec<DateTime<Utc>>, ChannelError> {
    if step <= Duration::zero() {
        return Err(ChannelError::InvalidWindow("step must be positive".into()));
    }
    if end < start {
        return Err(ChannelError::InvalidWindow(format!(
            "end {} is before start {}",
            end, start
        )));
    }

    let mut cursor = start;
    let mut points = Vec::new();
    while cursor <= end {
        points.push(cursor);
        cursor += step;
    }
    Ok(points)
}

pub fn ensure_increasing(times: &[DateTime<Utc>]) -> Result<(), ChannelError> {
    if times.is_empty() {
        return Err(ChannelError::EmptySeries);
    }
    match times.windows(2).position(|w| w[1] <= w[0]) {
        Some(i) => Err(ChannelError::NonMonotonicTime(i + 1)),
        None => Ok(()),
    }
}
