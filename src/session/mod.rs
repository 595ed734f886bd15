//! Session management for prompt generation
//!
//! Each session keeps a fixed rolling window of recently generated prompts
//! so consecutive generations can build on the same scene. The store hands
//! out per-session locks: one in-flight generation per session id, while
//! distinct ids proceed in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::debug;

/// Session id used when the caller supplies none.
pub const DEFAULT_SESSION_ID: &str = "default";

/// Number of recent prompts retained per session.
pub const RECENT_PROMPT_SLOTS: usize = 5;

/// Rolling prompt-history context for one client session.
///
/// `recent_prompts` always holds exactly [`RECENT_PROMPT_SLOTS`] entries,
/// newest first, padded with empty strings. An empty string is the "no
/// prompt" sentinel; entries are never absent.
#[derive(Debug, Clone)]
pub struct Session {
    /// Recent prompts, newest at index 0.
    pub recent_prompts: [String; RECENT_PROMPT_SLOTS],
    /// When the session was first referenced. Informational only.
    pub created_at: Instant,
}

impl Session {
    pub fn new() -> Self {
        Self {
            recent_prompts: Default::default(),
            created_at: Instant::now(),
        }
    }

    /// Slide the window: drop the oldest prompt, insert the new one at the front.
    pub fn rotate(&mut self, new_prompt: String) {
        self.recent_prompts.rotate_right(1);
        self.recent_prompts[0] = new_prompt;
    }

    /// The most recently generated prompt, if any.
    pub fn latest(&self) -> Option<&str> {
        let latest = self.recent_prompts[0].as_str();
        if latest.is_empty() {
            None
        } else {
            Some(latest)
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Store eviction knobs. Injected so tests control capacity and idle time.
#[derive(Debug, Clone)]
pub struct SessionStoreConfig {
    /// Maximum live sessions; creating one past this evicts the least
    /// recently used.
    pub capacity: usize,
    /// Sessions untouched for longer than this are purged on next access.
    pub idle_ttl: Duration,
}

impl Default for SessionStoreConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            idle_ttl: Duration::from_secs(3600),
        }
    }
}

struct Entry {
    session: Arc<tokio::sync::Mutex<Session>>,
    last_used: Instant,
}

/// In-memory session store with LRU capacity and idle-TTL eviction.
///
/// `checkout` returns the session behind its own async mutex; the caller
/// holds that lock across the whole read-compile-call-rotate sequence so two
/// concurrent requests for one id cannot interleave their rotations. The map
/// lock itself is only held for bookkeeping, never across provider calls.
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Entry>>,
    config: SessionStoreConfig,
}

impl SessionStore {
    pub fn new(config: SessionStoreConfig) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Get or lazily create the session for `id`, returning its lock.
    ///
    /// An empty id maps to [`DEFAULT_SESSION_ID`]. Idle sessions are purged
    /// and, when a new id would exceed capacity, the least recently used
    /// session is evicted first.
    pub fn checkout(&self, id: &str) -> Arc<tokio::sync::Mutex<Session>> {
        let id = if id.is_empty() { DEFAULT_SESSION_ID } else { id };
        let now = Instant::now();

        let mut sessions = self.sessions.lock().expect("session map poisoned");

        sessions.retain(|sid, entry| {
            let keep = now.duration_since(entry.last_used) <= self.config.idle_ttl;
            if !keep {
                debug!(session_id = %sid, "evicting idle session");
            }
            keep
        });

        if !sessions.contains_key(id) && sessions.len() >= self.config.capacity {
            if let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(sid, _)| sid.clone())
            {
                debug!(session_id = %oldest, "evicting least recently used session");
                sessions.remove(&oldest);
            }
        }

        let entry = sessions.entry(id.to_string()).or_insert_with(|| Entry {
            session: Arc::new(tokio::sync::Mutex::new(Session::new())),
            last_used: now,
        });
        entry.last_used = now;
        Arc::clone(&entry.session)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.lock().expect("session map poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionStoreConfig::default())
    }
}
