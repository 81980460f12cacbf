use std::path::Path;

use serde::Serialize;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::aggregate::{
    self, IpCount, MinuteCount, StatusCount, UrlCount, UserAgentCount,
};
use crate::error::{BatchError, ParseError};
use crate::log_record::LogRecord;
use crate::partition::PartitionedStore;

/// Where a run currently is. Transitions are strictly forward, one pass;
/// `Failed` is terminal and only reachable when the input itself cannot
/// be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Parsing,
    Partitioning,
    Aggregating,
    Done,
    Failed,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub top_urls: usize,
    pub failed_statuses: Vec<u16>,
    pub min_failed: u64,
    pub anonymize: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            top_urls: 10,
            failed_statuses: aggregate::DEFAULT_FAILED_STATUSES.to_vec(),
            min_failed: aggregate::DEFAULT_MIN_FAILED,
            anonymize: false,
        }
    }
}

/// A line the parser rejected. 1-based line number, recorded in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    pub line: u64,
    pub error: ParseError,
}

/// Everything one batch produces: the six query results plus the lines
/// that were skipped as malformed.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub total_requests: u64,
    pub requests_by_status: Vec<StatusCount>,
    pub top_urls: Vec<UrlCount>,
    pub top_user_agents: Vec<UserAgentCount>,
    pub failed_ips: Vec<IpCount>,
    pub requests_over_time: Vec<MinuteCount>,
    pub skipped: Vec<SkippedLine>,
}

#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    stage: Stage,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Pipeline {
        Pipeline {
            config,
            stage: Stage::Idle,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Run one batch over already-read lines: parse, partition, aggregate.
    /// Malformed lines are logged, recorded and skipped; the batch never
    /// aborts because of them.
    pub fn run<I, S>(&mut self, lines: I) -> BatchReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stage = Stage::Parsing;
        let mut records = Vec::new();
        let mut skipped = Vec::new();
        for (idx, line) in lines.into_iter().enumerate() {
            let number = idx as u64 + 1;
            match LogRecord::parse(line.as_ref()) {
                Ok(record) => records.push(record),
                Err(error) => {
                    warn!(line = number, %error, "skipping malformed line");
                    skipped.push(SkippedLine { line: number, error });
                }
            }
        }
        info!(
            records = records.len(),
            skipped = skipped.len(),
            "parsed batch"
        );

        if self.config.anonymize {
            for record in &mut records {
                record.anonymize();
            }
        }

        self.stage = Stage::Partitioning;
        let store = PartitionedStore::build(&records);
        info!(partitions = store.statuses().count(), "partitioned by status");

        self.stage = Stage::Aggregating;
        let report = BatchReport {
            total_requests: aggregate::total_requests(&records),
            requests_by_status: aggregate::requests_by_status(&store),
            top_urls: aggregate::top_urls(&records, self.config.top_urls),
            top_user_agents: aggregate::top_user_agents(&records),
            failed_ips: aggregate::failed_ips(
                &records,
                &self.config.failed_statuses,
                self.config.min_failed,
            ),
            requests_over_time: aggregate::requests_over_time(&records),
            skipped,
        };

        self.stage = Stage::Done;
        report
    }

    /// Read the input file and run the batch over its lines. An unreadable
    /// input is the one fatal condition; it surfaces before any stage
    /// consumes data.
    pub async fn run_file(&mut self, path: &Path) -> Result<BatchReport, BatchError> {
        let file = match File::open(path).await {
            Ok(file) => file,
            Err(source) => {
                self.stage = Stage::Failed;
                return Err(BatchError::Input {
                    path: path.to_owned(),
                    source,
                });
            }
        };

        let mut lines = Vec::new();
        let mut reader = BufReader::new(file).lines();
        loop {
            match reader.next_line().await {
                Ok(Some(line)) => lines.push(line),
                Ok(None) => break,
                Err(source) => {
                    self.stage = Stage::Failed;
                    return Err(BatchError::Input {
                        path: path.to_owned(),
                        source,
                    });
                }
            }
        }

        Ok(self.run(lines))
    }
}
