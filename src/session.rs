//! One navigation session per client.
//!
//! The adapter is moved into a tokio task that applies commands strictly one
//! at a time, so the crosshair state of a session is never shared or
//! mutated concurrently. Callers talk to it through a cloneable
//! [`SessionHandle`].

use futures::channel::oneshot;
use glam::DVec3;
use log::debug;
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    enums::Handle,
    navigation::{CrosshairState, NavigationError, NavigationUpdate},
    plane::PlaneSet,
    view_sync::{RenderSink, ViewSyncAdapter, WheelEvent},
};

const SESSION_QUEUE_DEPTH: usize = 64;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session is closed")]
    Closed,

    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

type Reply<T> = oneshot::Sender<T>;

enum Command {
    Drag {
        view_id: i64,
        handle: Handle,
        center: DVec3,
        reply: Reply<Result<NavigationUpdate, NavigationError>>,
    },
    Wheel {
        event: WheelEvent,
        reply: Reply<Result<NavigationUpdate, NavigationError>>,
    },
    Planes {
        reply: Reply<PlaneSet>,
    },
    State {
        reply: Reply<CrosshairState>,
    },
}

#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
}

/// Start a session task owning `adapter`.
///
/// The views are published once before the first command is handled. The
/// task ends when every handle is dropped and gives the adapter back.
pub fn spawn<S>(mut adapter: ViewSyncAdapter<S>) -> (SessionHandle, JoinHandle<ViewSyncAdapter<S>>)
where
    S: RenderSink + Send + 'static,
{
    let (commands, mut inbox) = mpsc::channel(SESSION_QUEUE_DEPTH);
    let task = tokio::spawn(async move {
        adapter.initialize();
        while let Some(command) = inbox.recv().await {
            match command {
                Command::Drag {
                    view_id,
                    handle,
                    center,
                    reply,
                } => {
                    let _ = reply.send(adapter.on_handle_drag(view_id, handle, center));
                }
                Command::Wheel { event, reply } => {
                    let _ = reply.send(adapter.on_wheel(&event));
                }
                Command::Planes { reply } => {
                    let _ = reply.send(*adapter.controller().planes());
                }
                Command::State { reply } => {
                    let _ = reply.send(*adapter.controller().state());
                }
            }
        }
        debug!("navigation session closed");
        adapter
    });
    (SessionHandle { commands }, task)
}

impl SessionHandle {
    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, SessionError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| SessionError::Closed)?;
        response.await.map_err(|_| SessionError::Closed)
    }

    pub async fn drag(
        &self,
        view_id: i64,
        handle: Handle,
        center: DVec3,
    ) -> Result<NavigationUpdate, SessionError> {
        Ok(self
            .request(|reply| Command::Drag {
                view_id,
                handle,
                center,
                reply,
            })
            .await??)
    }

    pub async fn wheel(&self, event: WheelEvent) -> Result<NavigationUpdate, SessionError> {
        Ok(self
            .request(|reply| Command::Wheel { event, reply })
            .await??)
    }

    pub async fn planes(&self) -> Result<PlaneSet, SessionError> {
        self.request(|reply| Command::Planes { reply }).await
    }

    pub async fn state(&self) -> Result<CrosshairState, SessionError> {
        self.request(|reply| Command::State { reply }).await
    }
}
