use log::warn;
use tokio::sync::mpsc;

use crate::query::TableParams;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisitOptions {
    /// Replace the current history entry instead of pushing a new one.
    pub replace: bool,
    /// Keep client-held state (search text, sort) across the round trip.
    pub preserve_state: bool,
}

impl VisitOptions {
    /// What every table interaction uses.
    pub const TABLE: VisitOptions = VisitOptions {
        replace: true,
        preserve_state: true,
    };
}

/// One navigation request: a GET of `path` with `params` as the query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    pub path: String,
    pub params: TableParams,
    pub options: VisitOptions,
}

impl Visit {
    pub fn url(&self) -> String {
        let query = self.params.to_query_string();
        match query.is_empty() {
            true => self.path.clone(),
            false => format!("{}?{}", self.path, query),
        }
    }
}

pub trait Navigator: Send + Sync {
    fn visit(&self, visit: Visit);
}

/// Hands visits to whoever owns the receiving end, typically the client loop.
#[derive(Debug, Clone)]
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<Visit>,
}

impl ChannelNavigator {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Visit>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChannelNavigator { tx }, rx)
    }
}

impl Navigator for ChannelNavigator {
    fn visit(&self, visit: Visit) {
        if self.tx.send(visit).is_err() {
            warn!("Navigation dropped: receiver has gone away");
        }
    }
}

/// Browser-style history of visited URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: Vec<String>,
}

impl History {
    pub fn new(initial: impl Into<String>) -> Self {
        History {
            entries: vec![initial.into()],
        }
    }

    pub fn record(&mut self, url: impl Into<String>, options: VisitOptions) {
        let url = url.into();
        match (options.replace, self.entries.last_mut()) {
            (true, Some(current)) => *current = url,
            _ => self.entries.push(url),
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
