//! Performance sampling for calculator calls
//!
//! Every call through the engine appends one sample to a bounded buffer,
//! oldest samples dropping first once it is full.

use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use jiff::Timestamp;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BUFFER_CAPACITY: usize = 1000;

/// Asymptotic cost of a calculator in its input size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Complexity {
    #[serde(rename = "O(1)")]
    Constant,
    #[serde(rename = "O(n)")]
    Linear,
    #[serde(rename = "O(n log n)")]
    Linearithmic,
    #[serde(rename = "O(n²)")]
    Quadratic,
    Unknown,
}

impl Complexity {
    /// Label for a calculator name as registered with the engine
    #[must_use]
    pub fn for_function(name: &str) -> Self {
        match name {
            "compound_interest" => Complexity::Constant,
            "monte_carlo" => Complexity::Quadratic,
            "fire_number" | "debt_payoff" => Complexity::Linear,
            "savings_plan" => Complexity::Linearithmic,
            _ => Complexity::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSample {
    pub function_name: String,
    pub execution_time_ms: f64,
    pub cache_hit: bool,
    pub input_size: usize,
    pub complexity: Complexity,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionStats {
    pub calls: usize,
    pub cache_hits: usize,
    /// Mean over calls that were not served from the cache
    pub average_compute_time_ms: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub total_calls: usize,
    pub cache_hits: usize,
    pub cache_hit_rate: f64,
    pub average_compute_time_ms: f64,
    pub per_function: BTreeMap<String, FunctionStats>,
}

/// Bounded FIFO buffer of [`PerformanceSample`]s
#[derive(Debug)]
pub struct PerformanceRecorder {
    samples: Mutex<VecDeque<PerformanceSample>>,
    capacity: usize,
}

impl Default for PerformanceRecorder {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }
}

impl PerformanceRecorder {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_BUFFER_CAPACITY))),
            capacity,
        }
    }

    pub fn record(
        &self,
        function_name: &str,
        execution_time: Duration,
        cache_hit: bool,
        input_size: usize,
    ) {
        if self.capacity == 0 {
            return;
        }
        let sample = PerformanceSample {
            function_name: function_name.to_string(),
            execution_time_ms: execution_time.as_secs_f64() * 1000.0,
            cache_hit,
            input_size,
            complexity: Complexity::for_function(function_name),
            timestamp: Timestamp::now(),
        };
        let mut samples = self.samples.lock();
        while samples.len() >= self.capacity {
            samples.pop_front();
        }
        samples.push_back(sample);
    }

    /// Snapshot of the buffer, oldest first
    #[must_use]
    pub fn samples(&self) -> Vec<PerformanceSample> {
        self.samples.lock().iter().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn stats(&self) -> PerformanceStats {
        let samples = self.samples.lock();

        let mut per_function: BTreeMap<String, FunctionStats> = BTreeMap::new();
        // (sum, count) of compute times for non-hit samples
        let mut compute: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        let (mut total_ms, mut computed) = (0.0, 0usize);
        let mut cache_hits = 0;

        for s in samples.iter() {
            let f = per_function.entry(s.function_name.clone()).or_default();
            f.calls += 1;
            if s.cache_hit {
                f.cache_hits += 1;
                cache_hits += 1;
            } else {
                let c = compute.entry(s.function_name.as_str()).or_default();
                c.0 += s.execution_time_ms;
                c.1 += 1;
                total_ms += s.execution_time_ms;
                computed += 1;
            }
        }
        for (name, (sum, count)) in compute {
            if let Some(f) = per_function.get_mut(name) {
                f.average_compute_time_ms = sum / count as f64;
            }
        }

        let total_calls = samples.len();
        PerformanceStats {
            total_calls,
            cache_hits,
            cache_hit_rate: if total_calls == 0 {
                0.0
            } else {
                cache_hits as f64 / total_calls as f64
            },
            average_compute_time_ms: if computed == 0 {
                0.0
            } else {
                total_ms / computed as f64
            },
            per_function,
        }
    }
}
