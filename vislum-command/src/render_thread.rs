use std::{
    sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError},
    thread::{self, JoinHandle},
};

use crate::Error;

type Task = Box<dyn FnOnce() + Send>;

struct State {
    tasks: Vec<Task>,
    running: bool,
    drawing: bool,
}

struct Inner {
    state: Mutex<State>,
    wake: Condvar,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A worker thread that runs posted tasks and, while drawing is enabled, a
/// draw callback once per iteration.
///
/// The worker sleeps while there is nothing to do. Tasks posted before
/// [`RenderThread::join`] still run; the draw callback does not run again once
/// shutdown has been requested.
pub struct RenderThread {
    inner: Arc<Inner>,
    thread: Option<JoinHandle<()>>,
}

impl RenderThread {
    pub fn new<F>(draw: F) -> Result<Self, Error>
    where
        F: FnMut() + Send + 'static,
    {
        let inner = Arc::new(Inner {
            state: Mutex::new(State {
                tasks: Vec::new(),
                running: true,
                drawing: false,
            }),
            wake: Condvar::new(),
        });

        let worker = Arc::clone(&inner);
        let thread = thread::Builder::new()
            .name("render".to_string())
            .spawn(move || run(&worker, draw))
            .map_err(Error::Spawn)?;

        Ok(Self {
            inner,
            thread: Some(thread),
        })
    }

    /// Queues a task to run on the worker.
    pub fn post<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner.lock().tasks.push(Box::new(task));
        self.inner.wake.notify_one();
    }

    /// Enables or disables the draw callback.
    pub fn set_drawing(&self, drawing: bool) {
        self.inner.lock().drawing = drawing;
        self.inner.wake.notify_one();
    }

    pub fn is_drawing(&self) -> bool {
        self.inner.lock().drawing
    }

    /// Stops the worker and waits for it to exit.
    pub fn join(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };

        self.inner.lock().running = false;
        self.inner.wake.notify_one();

        if thread.join().is_err() {
            log::error!("Render thread panicked");
        }
    }
}

impl Drop for RenderThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(inner: &Inner, mut draw: impl FnMut()) {
    log::debug!("Render thread started");

    loop {
        let (tasks, drawing, running) = {
            let mut state = inner.lock();
            while state.running && state.tasks.is_empty() && !state.drawing {
                state = inner.wake.wait(state).unwrap_or_else(PoisonError::into_inner);
            }

            (std::mem::take(&mut state.tasks), state.drawing, state.running)
        };

        for task in tasks {
            task();
        }

        if !running {
            break;
        }

        if drawing {
            draw();
        }
    }

    log::debug!("Render thread stopped");
}
