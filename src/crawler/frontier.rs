//! Breadth-first crawl frontier
//!
//! The frontier owns both the FIFO queue of URLs waiting to be fetched and the
//! set of every canonical URL ever enqueued. A URL enters the queue at most
//! once per run, so the queue plus the seen-set is the single source of truth
//! for "already discovered".

use std::collections::{HashSet, VecDeque};
use url::Url;

/// FIFO queue plus queued-or-visited set
#[derive(Debug, Default)]
pub struct Frontier {
    /// URLs waiting to be fetched, oldest first
    queue: VecDeque<Url>,

    /// Canonical string of every URL ever enqueued (queued ∪ visited)
    seen: HashSet<String>,

    /// Number of URLs handed out by `dequeue`
    visited: usize,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a canonical URL unless it has been seen before
    ///
    /// # Returns
    ///
    /// * `true` - The URL was new and is now queued
    /// * `false` - The URL was already queued or visited; nothing changed
    pub fn enqueue(&mut self, url: Url) -> bool {
        if !self.seen.insert(url.as_str().to_string()) {
            return false;
        }
        self.queue.push_back(url);
        true
    }

    /// Pops the oldest queued URL and marks it visited
    ///
    /// Returns `None` when the queue is empty.
    pub fn dequeue(&mut self) -> Option<Url> {
        let url = self.queue.pop_front()?;
        self.visited += 1;
        Some(url)
    }

    /// Records a URL fetched outside the queue (a followed redirect target)
    ///
    /// Returns `false` if it was already queued or visited.
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        if !self.seen.insert(url.as_str().to_string()) {
            return false;
        }
        self.visited += 1;
        true
    }

    /// Number of URLs still waiting to be fetched
    pub fn size(&self) -> usize {
        self.queue.len()
    }

    /// Returns true when nothing is waiting to be fetched
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns true if the URL was ever enqueued
    pub fn contains(&self, url: &Url) -> bool {
        self.seen.contains(url.as_str())
    }

    /// Number of URLs fetched so far, redirect targets included
    pub fn visited_count(&self) -> usize {
        self.visited
    }

    /// Number of distinct URLs ever enqueued
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(path: &str) -> Url {
        Url::parse(&format!("https://example.edu{}", path)).unwrap()
    }

    #[test]
    fn test_new_frontier_is_empty() {
        let mut frontier = Frontier::new();
        assert!(frontier.is_empty());
        assert_eq!(frontier.size(), 0);
        assert_eq!(frontier.dequeue(), None);
        assert_eq!(frontier.visited_count(), 0);
    }

    #[test]
    fn test_fifo_order() {
        let mut frontier = Frontier::new();
        frontier.enqueue(url("/"));
        frontier.enqueue(url("/a"));
        frontier.enqueue(url("/b"));

        assert_eq!(frontier.dequeue(), Some(url("/")));
        assert_eq!(frontier.dequeue(), Some(url("/a")));
        assert_eq!(frontier.dequeue(), Some(url("/b")));
        assert_eq!(frontier.dequeue(), None);
    }

    #[test]
    fn test_duplicate_enqueue_is_noop() {
        let mut frontier = Frontier::new();
        assert!(frontier.enqueue(url("/a")));
        assert!(!frontier.enqueue(url("/a")));
        assert_eq!(frontier.size(), 1);
    }

    #[test]
    fn test_visited_url_not_requeued() {
        let mut frontier = Frontier::new();
        frontier.enqueue(url("/"));
        assert_eq!(frontier.dequeue(), Some(url("/")));

        assert!(!frontier.enqueue(url("/")));
        assert!(frontier.is_empty());
        assert!(frontier.contains(&url("/")));
        assert_eq!(frontier.visited_count(), 1);
        assert_eq!(frontier.seen_count(), 1);
    }

    #[test]
    fn test_redirect_target_never_queued_later() {
        let mut frontier = Frontier::new();
        frontier.enqueue(url("/old"));
        frontier.dequeue();

        assert!(frontier.mark_visited(&url("/new")));
        assert!(!frontier.mark_visited(&url("/new")));
        assert!(!frontier.enqueue(url("/new")));
        assert!(frontier.is_empty());
        assert_eq!(frontier.visited_count(), 2);
        assert_eq!(frontier.seen_count(), 2);
    }

    #[test]
    fn test_breadth_first_interleaving() {
        // "/" links to /a and /b; /a links to /c. BFS must fetch /b before /c.
        let mut frontier = Frontier::new();
        frontier.enqueue(url("/"));

        let mut order = Vec::new();
        while let Some(next) = frontier.dequeue() {
            order.push(next.path().to_string());
            match next.path() {
                "/" => {
                    frontier.enqueue(url("/a"));
                    frontier.enqueue(url("/b"));
                }
                "/a" => {
                    frontier.enqueue(url("/c"));
                    frontier.enqueue(url("/"));
                }
                _ => {}
            }
        }

        assert_eq!(order, vec!["/", "/a", "/b", "/c"]);
    }
}
