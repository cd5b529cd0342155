//! Board DragDrop Coordination
//!
//! Holds the task being dragged across the gap between drag-start and drop.
//! Uses movement threshold to distinguish click from drag.
//!
//! Drag-end and drop can arrive in either order depending on the input device,
//! so a drag-end does not forget the dragged task right away: it stays
//! available to a late drop for a short grace window and is then discarded.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

/// Drop target types
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropTarget {
    /// Dropped on a task card (insert before it)
    Task(u32),
    /// Dropped on a column's empty area; None = the unsectioned column
    Section(Option<u32>),
}

/// Movement threshold in pixels to start dragging
pub const DRAG_THRESHOLD_PX: i32 = 5;

/// How long a drag-end keeps the dragged task for a late drop
pub const DEFAULT_GRACE: Duration = Duration::from_millis(100);

#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
    Idle,
    /// Pressed but not yet moved past the threshold
    Pending { id: u32, start_x: i32, start_y: i32 },
    Dragging(u32),
    /// Drag-end seen, drop not yet
    Ended { id: u32, at: Instant },
}

#[derive(Debug)]
struct DndState {
    phase: Phase,
    hover: Option<DropTarget>,
    just_ended_at: Option<Instant>,
}

/// Shared drag state. Clones share the same state.
#[derive(Clone)]
pub struct DragCoordinator {
    state: Arc<Mutex<DndState>>,
    grace: Duration,
}

impl Default for DragCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_GRACE)
    }
}

impl DragCoordinator {
    pub fn new(grace: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(DndState {
                phase: Phase::Idle,
                hover: None,
                just_ended_at: None,
            })),
            grace,
        }
    }

    pub fn grace(&self) -> Duration {
        self.grace
    }

    /// Record a pending drag with its start position (pointer down on a card)
    pub fn press(&self, task_id: u32, x: i32, y: i32) {
        let mut st = self.state.lock();
        if matches!(st.phase, Phase::Idle | Phase::Ended { .. }) {
            st.phase = Phase::Pending { id: task_id, start_x: x, start_y: y };
        }
    }

    /// Starts the drag once the pointer has moved far enough. Returns true if it started.
    pub fn pointer_moved(&self, x: i32, y: i32) -> bool {
        let mut st = self.state.lock();
        if let Phase::Pending { id, start_x, start_y } = st.phase {
            let dx = (x - start_x).abs();
            let dy = (y - start_y).abs();
            if dx > DRAG_THRESHOLD_PX || dy > DRAG_THRESHOLD_PX {
                st.phase = Phase::Dragging(id);
                st.hover = None;
                tracing::debug!(task_id = id, "drag started");
                return true;
            }
        }
        false
    }

    /// Drag-start from a native drag event; replaces any earlier gesture
    pub fn start_drag(&self, task_id: u32) {
        let mut st = self.state.lock();
        st.phase = Phase::Dragging(task_id);
        st.hover = None;
        tracing::debug!(task_id, "drag started");
    }

    /// Pointer entered a target while dragging. Visual feedback only.
    pub fn drag_over(&self, target: DropTarget) {
        let mut st = self.state.lock();
        if let Phase::Dragging(id) = st.phase {
            // Don't allow dropping on self
            if target != DropTarget::Task(id) {
                st.hover = Some(target);
            }
        }
    }

    /// Pointer left the hovered target
    pub fn leave(&self) {
        let mut st = self.state.lock();
        if matches!(st.phase, Phase::Dragging(_)) {
            st.hover = None;
        }
    }

    pub fn hover_target(&self) -> Option<DropTarget> {
        self.state.lock().hover
    }

    /// The task being dragged, including one whose drag-end is still within the grace window
    pub fn dragging_id(&self) -> Option<u32> {
        let st = self.state.lock();
        match st.phase {
            Phase::Dragging(id) => Some(id),
            Phase::Ended { id, at } if at.elapsed() < self.grace => Some(id),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.dragging_id().is_none() && !matches!(self.state.lock().phase, Phase::Pending { .. })
    }

    /// Drag-end event. The dragged task is kept for a late drop and discarded
    /// after the grace delay.
    pub fn end_drag(&self) {
        {
            let mut st = self.state.lock();
            match st.phase {
                Phase::Dragging(id) => {
                    let now = Instant::now();
                    st.phase = Phase::Ended { id, at: now };
                    st.just_ended_at = Some(now);
                }
                Phase::Pending { .. } => {
                    st.phase = Phase::Idle;
                    st.hover = None;
                    return;
                }
                Phase::Idle | Phase::Ended { .. } => return,
            }
        }

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let this = self.clone();
            handle.spawn(async move {
                this.expire_after_grace().await;
            });
        }
    }

    /// Drop event. Returns the dragged task and the target if a drag is in
    /// progress or ended within the grace window; the state returns to idle.
    pub fn drop_on(&self, target: DropTarget) -> Option<(u32, DropTarget)> {
        let mut st = self.state.lock();
        let dragged = match st.phase {
            Phase::Dragging(id) => Some(id),
            Phase::Ended { id, at } if at.elapsed() < self.grace => Some(id),
            Phase::Ended { id, .. } => {
                tracing::debug!(task_id = id, "drop arrived after the grace window");
                None
            }
            Phase::Idle | Phase::Pending { .. } => None,
        };
        st.phase = Phase::Idle;
        st.hover = None;
        if dragged.is_some() {
            st.just_ended_at = Some(Instant::now());
        }
        dragged.map(|id| (id, target))
    }

    /// Pointer released: drop on the hovered target if there is one, otherwise
    /// treat it as a drag-end without drop.
    pub fn release(&self) -> Option<(u32, DropTarget)> {
        let hover = {
            let st = self.state.lock();
            match st.phase {
                Phase::Dragging(_) => st.hover,
                _ => None,
            }
        };
        match hover {
            Some(target) => self.drop_on(target),
            None => {
                self.end_drag();
                None
            }
        }
    }

    /// Whether a click right now is the tail of a drag and should be ignored
    pub fn suppress_click(&self) -> bool {
        self.state
            .lock()
            .just_ended_at
            .map(|at| at.elapsed() < self.grace)
            .unwrap_or(false)
    }

    /// Discard an ended drag whose grace window has passed. Returns true if it did.
    pub fn sweep(&self) -> bool {
        let mut st = self.state.lock();
        match st.phase {
            Phase::Ended { id, at } if at.elapsed() >= self.grace => {
                st.phase = Phase::Idle;
                st.hover = None;
                tracing::debug!(task_id = id, "abandoned drag discarded");
                true
            }
            _ => false,
        }
    }

    /// Wait out the grace delay, then sweep
    pub async fn expire_after_grace(&self) {
        tokio::time::sleep(self.grace).await;
        self.sweep();
    }
}
