use std::collections::HashMap;

use serde::Serialize;

use crate::log_record::LogRecord;
use crate::partition::PartitionedStore;

/// Statuses counted as failures when no override is given.
pub const DEFAULT_FAILED_STATUSES: [u16; 2] = [404, 500];
/// Strict lower bound for the failure report when no override is given.
pub const DEFAULT_MIN_FAILED: u64 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: u16,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlCount {
    pub url: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserAgentCount {
    pub user_agent: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpCount {
    pub ip: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MinuteCount {
    pub minute: String,
    pub count: u64,
}

pub fn total_requests(records: &[LogRecord]) -> u64 {
    records.len() as u64
}

/// One row per discovered status, ascending. Statuses absent from the
/// input get no row.
pub fn requests_by_status(store: &PartitionedStore) -> Vec<StatusCount> {
    store
        .iter()
        .map(|(status, records)| StatusCount {
            status,
            count: records.len() as u64,
        })
        .collect()
}

/// Counts grouped by `key`, one entry per distinct value, in first-seen
/// order. Keys compare by exact bytes; no normalization.
fn count_by<'a, I, K>(records: I, key: K) -> Vec<(&'a str, u64)>
where
    I: IntoIterator<Item = &'a LogRecord>,
    K: Fn(&'a LogRecord) -> &'a str,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, u64)> = Vec::new();
    for record in records {
        let k = key(record);
        match index.get(k) {
            Some(&i) => groups[i].1 += 1,
            None => {
                index.insert(k, groups.len());
                groups.push((k, 1));
            }
        }
    }
    groups
}

/// Top `n` URLs by request count, descending. Ties keep first-seen input
/// order (stable sort), so equal counts rank in the order the URLs first
/// appeared in the batch.
pub fn top_urls(records: &[LogRecord], n: usize) -> Vec<UrlCount> {
    let mut groups = count_by(records, |r| r.url.as_str());
    groups.sort_by(|a, b| b.1.cmp(&a.1));
    groups.truncate(n);
    groups
        .into_iter()
        .map(|(url, count)| UrlCount {
            url: url.to_owned(),
            count,
        })
        .collect()
}

/// Full user-agent ranking, descending by count, same tie-break as
/// [`top_urls`]. No limit: the ranking covers every agent seen.
pub fn top_user_agents(records: &[LogRecord]) -> Vec<UserAgentCount> {
    let mut groups = count_by(records, |r| r.user_agent.as_str());
    groups.sort_by(|a, b| b.1.cmp(&a.1));
    groups
        .into_iter()
        .map(|(user_agent, count)| UserAgentCount {
            user_agent: user_agent.to_owned(),
            count,
        })
        .collect()
}

/// Addresses with strictly more than `min_count` requests whose status is
/// in `statuses`. Rows keep first-seen input order.
pub fn failed_ips(records: &[LogRecord], statuses: &[u16], min_count: u64) -> Vec<IpCount> {
    count_by(
        records.iter().filter(|r| statuses.contains(&r.status)),
        |r| r.ip.as_str(),
    )
    .into_iter()
    .filter(|&(_, count)| count > min_count)
    .map(|(ip, count)| IpCount {
        ip: ip.to_owned(),
        count,
    })
    .collect()
}

/// Request counts per minute bucket, ascending lexicographically by the
/// bucket string (chronological for the fixed timestamp format).
pub fn requests_over_time(records: &[LogRecord]) -> Vec<MinuteCount> {
    let mut groups = count_by(records, |r| r.minute_bucket());
    groups.sort_by(|a, b| a.0.cmp(b.0));
    groups
        .into_iter()
        .map(|(minute, count)| MinuteCount {
            minute: minute.to_owned(),
            count,
        })
        .collect()
}
