use crossbeam_channel::{Receiver, Sender, unbounded};

/// Wakes the embedding event loop after work has been queued for it.
pub trait EventLoopWaker: Send + Sync + 'static {
    /// Clone the waker for another thread.
    fn clone_box(&self) -> Box<dyn EventLoopWaker>;
    /// Wake the event loop.
    fn wake(&self);
}

impl Clone for Box<dyn EventLoopWaker> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// A unit of work that must run on the thread owning browser objects.
pub type UiTask = Box<dyn FnOnce() + Send>;

/// Sending half of the UI task queue. Cheap to clone and usable from any
/// thread; every post wakes the event loop so the task gets drained.
pub struct UiTaskProxy {
    sender: Sender<UiTask>,
    waker: Box<dyn EventLoopWaker>,
}

impl UiTaskProxy {
    /// Queue a task for the UI thread.
    pub fn post(&self, task: UiTask) {
        if self.sender.send(task).is_err() {
            log::warn!("UI task queue is gone, dropping task");
            return;
        }
        self.waker.wake();
    }
}

impl Clone for UiTaskProxy {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            waker: self.waker.clone(),
        }
    }
}

/// Receiving half of the UI task queue, drained by the UI thread.
pub struct UiTaskRunner {
    receiver: Receiver<UiTask>,
}

impl UiTaskRunner {
    /// Run every task queued so far and return how many ran.
    pub fn run_pending(&self) -> usize {
        let mut count = 0;
        while let Ok(task) = self.receiver.try_recv() {
            task();
            count += 1;
        }
        count
    }
}

/// Create the UI task queue. The proxy side is handed to coordinators that
/// may run off the UI thread; the runner side stays with the event loop.
pub fn ui_task_channel(waker: Box<dyn EventLoopWaker>) -> (UiTaskProxy, UiTaskRunner) {
    let (sender, receiver) = unbounded();
    (UiTaskProxy { sender, waker }, UiTaskRunner { receiver })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone)]
    struct CountingWaker(Arc<AtomicUsize>);

    impl EventLoopWaker for CountingWaker {
        fn clone_box(&self) -> Box<dyn EventLoopWaker> {
            Box::new(self.clone())
        }

        fn wake(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn posted_tasks_run_on_drain_and_wake_the_loop() {
        let wakes = Arc::new(AtomicUsize::new(0));
        let (proxy, runner) = ui_task_channel(Box::new(CountingWaker(wakes.clone())));

        let ran = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let ran = ran.clone();
            proxy.post(Box::new(move || {
                ran.fetch_add(1, Ordering::SeqCst);
            }));
        }

        assert_eq!(wakes.load(Ordering::SeqCst), 3);
        assert_eq!(runner.run_pending(), 3);
        assert_eq!(ran.load(Ordering::SeqCst), 3);
        assert_eq!(runner.run_pending(), 0);
    }

    #[test]
    fn tasks_posted_from_another_thread_arrive() {
        let wakes = Arc::new(AtomicUsize::new(0));
        let (proxy, runner) = ui_task_channel(Box::new(CountingWaker(wakes)));

        let handle = std::thread::spawn(move || {
            proxy.post(Box::new(|| {}));
        });
        handle.join().unwrap();

        assert_eq!(runner.run_pending(), 1);
    }
}
