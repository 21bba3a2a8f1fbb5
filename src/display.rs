//! Lifecycle of the display surface.
//!
//! The UI thread owns a [`DisplayHandle`]. Worker threads get a
//! [`DisplayProxy`], which can read liveness and queue work onto the UI thread
//! but cannot touch the surface itself.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::error::{Error, Result};

/// Work to run on the UI thread with access to the surface.
pub type UiTask<S> = Box<dyn FnOnce(&S) + Send + 'static>;

pub trait DisplaySurface: Sized + Send + Sync + 'static {
    /// Show the document at `url`. Only called on the UI thread.
    fn navigate(&self, url: &Url) -> Result<()>;

    /// Queue `task` onto the UI thread.
    fn dispatch(&self, task: UiTask<Self>);

    /// Tear the surface down. Only called on the UI thread, at most once.
    fn destroy(&self);
}

pub struct DisplayHandle<S: DisplaySurface> {
    surface: Arc<S>,
    alive: Arc<AtomicBool>,
}

impl<S: DisplaySurface> DisplayHandle<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface: Arc::new(surface),
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn navigate(&self, url: &Url) -> Result<()> {
        if !self.is_alive() {
            return Err(Error::Lifecycle);
        }
        self.surface.navigate(url)
    }

    /// Idempotent: only the first call reaches the surface.
    pub fn destroy(&self) {
        if self.alive.swap(false, Ordering::AcqRel) {
            debug!("destroying display");
            self.surface.destroy();
        }
    }

    /// Inbound bridge for a user close intent.
    pub fn request_close(&self) {
        debug!("close requested");
        self.destroy();
    }

    pub fn proxy(&self) -> DisplayProxy<S> {
        DisplayProxy {
            surface: Arc::clone(&self.surface),
            alive: Arc::clone(&self.alive),
        }
    }
}

pub struct DisplayProxy<S: DisplaySurface> {
    surface: Arc<S>,
    alive: Arc<AtomicBool>,
}

impl<S: DisplaySurface> Clone for DisplayProxy<S> {
    fn clone(&self) -> Self {
        Self {
            surface: Arc::clone(&self.surface),
            alive: Arc::clone(&self.alive),
        }
    }
}

impl<S: DisplaySurface> DisplayProxy<S> {
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Queues `task` onto the UI thread. Returns false, dropping the task, if
    /// the display is already destroyed. The task is also skipped if the
    /// display is destroyed while it waits in the queue.
    pub fn dispatch<F>(&self, task: F) -> bool
    where
        F: FnOnce(&S) + Send + 'static,
    {
        if !self.is_alive() {
            return false;
        }
        let alive = Arc::clone(&self.alive);
        self.surface.dispatch(Box::new(move |surface: &S| {
            if alive.load(Ordering::Acquire) {
                task(surface);
            }
        }));
        true
    }
}
