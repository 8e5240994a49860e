//! 单元测试使用的记录型引擎：统计句柄生命周期、保存句柄配置与每次交换的请求体，
//! 并按脚本返回响应。

use std::{collections::VecDeque, sync::Arc};

use parking_lot::Mutex;

use super::{BodyFraming, EngineHandle, ExchangeFailure, HandleSetup, HttpEngine};
use crate::error::{self, TransportError};

/// 引擎读取请求体时使用的块大小，刻意取小值以覆盖多次回调。
const CHUNK: usize = 7;

#[derive(Clone, Debug)]
pub(crate) enum Reply {
    /// 以给定状态码原样回显请求体。
    Echo(u16),
    /// 返回固定响应体。
    Body(u16, Vec<u8>),
    /// 交换失败。
    Fail(&'static str),
}

#[derive(Clone, Debug)]
pub(crate) struct Exchange {
    pub framing: BodyFraming,
    pub body: Vec<u8>,
}

#[derive(Debug, Default)]
pub(crate) struct Journal {
    pub created: usize,
    pub dropped: usize,
    pub setups: Vec<HandleSetup>,
    pub exchanges: Vec<Exchange>,
    replies: VecDeque<Reply>,
    reject_handles: Option<&'static str>,
}

impl Journal {
    pub fn live(&self) -> usize {
        self.created - self.dropped
    }

    pub fn last_setup(&self) -> &HandleSetup {
        self.setups.last().expect("no handle was created")
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct RecordingEngine {
    journal: Arc<Mutex<Journal>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条脚本化响应；脚本耗尽后默认 `Echo(200)`。
    pub fn reply(&self, reply: Reply) -> &Self {
        self.journal.lock().replies.push_back(reply);
        self
    }

    /// 之后的句柄创建全部失败。
    pub fn reject_handles(&self, detail: &'static str) {
        self.journal.lock().reject_handles = Some(detail);
    }

    pub fn journal(&self) -> parking_lot::MutexGuard<'_, Journal> {
        self.journal.lock()
    }
}

impl HttpEngine for RecordingEngine {
    type Handle = RecordingHandle;

    fn create_handle(&self, setup: HandleSetup) -> Result<RecordingHandle, TransportError> {
        let mut journal = self.journal.lock();
        if let Some(detail) = journal.reject_handles {
            return Err(error::configure(detail));
        }
        journal.created += 1;
        journal.setups.push(setup.clone());
        Ok(RecordingHandle {
            setup,
            journal: Arc::clone(&self.journal),
        })
    }
}

#[derive(Debug)]
pub(crate) struct RecordingHandle {
    setup: HandleSetup,
    journal: Arc<Mutex<Journal>>,
}

impl EngineHandle for RecordingHandle {
    fn perform(&mut self, framing: BodyFraming) -> Result<u16, ExchangeFailure> {
        let mut body = Vec::new();
        let mut chunk = [0u8; CHUNK];
        loop {
            let n = self.setup.outbound.fill(&mut chunk);
            if n == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..n]);
        }

        let reply = {
            let mut journal = self.journal.lock();
            journal.exchanges.push(Exchange {
                framing,
                body: body.clone(),
            });
            journal.replies.pop_front().unwrap_or(Reply::Echo(200))
        };

        let (status, response) = match reply {
            Reply::Echo(status) => (status, body),
            Reply::Body(status, response) => (status, response),
            Reply::Fail(detail) => return Err(ExchangeFailure::new(detail)),
        };
        for piece in response.chunks(CHUNK) {
            assert_eq!(self.setup.inbound.deliver(piece), piece.len());
        }
        Ok(status)
    }
}

impl Drop for RecordingHandle {
    fn drop(&mut self) {
        self.journal.lock().dropped += 1;
    }
}
