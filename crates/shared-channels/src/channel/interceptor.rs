//! # Interceptor Chain
//!
//! Ordered, append-only list of [`ChannelInterceptor`]s attached to a
//! channel. Every operation works on a snapshot of the chain taken when it
//! starts, so registering an interceptor never blocks or reorders an
//! in-flight send or receive.

use crate::domain::message::Message;
use crate::domain::selector::MessageSelector;
use crate::ports::outbound::ChannelInterceptor;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, trace};

type Interceptors<T> = Arc<Vec<Arc<dyn ChannelInterceptor<T>>>>;

/// Append-only interceptor registry owned by a channel.
pub struct InterceptorChain<T> {
    interceptors: RwLock<Interceptors<T>>,
}

impl<T> InterceptorChain<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            interceptors: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Append; earlier registrations keep running first.
    pub fn add(&self, interceptor: Arc<dyn ChannelInterceptor<T>>) {
        let mut guard = self.interceptors.write();
        let mut next: Vec<_> = guard.iter().cloned().collect();
        next.push(interceptor);
        *guard = Arc::new(next);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.interceptors.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interceptors.read().is_empty()
    }

    /// The chain as it stands right now.
    #[must_use]
    pub fn snapshot(&self) -> InterceptorList<T> {
        InterceptorList {
            interceptors: Arc::clone(&self.interceptors.read()),
        }
    }
}

impl<T> Default for InterceptorChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<Arc<dyn ChannelInterceptor<T>>>> for InterceptorChain<T> {
    fn from(interceptors: Vec<Arc<dyn ChannelInterceptor<T>>>) -> Self {
        Self {
            interceptors: RwLock::new(Arc::new(interceptors)),
        }
    }
}

/// Immutable view of a chain, used for the duration of one operation.
pub struct InterceptorList<T> {
    interceptors: Interceptors<T>,
}

impl<T> InterceptorList<T> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Run every `pre_send` in order. Stops at the first veto.
    pub fn pre_send(&self, message: Message<T>, channel: &str) -> Option<Message<T>> {
        let mut current = message;
        for (position, interceptor) in self.interceptors.iter().enumerate() {
            let id = current.id();
            match interceptor.pre_send(current, channel) {
                Some(next) => current = next,
                None => {
                    debug!(channel, position, message_id = %id, "Send vetoed by interceptor");
                    return None;
                }
            }
        }
        Some(current)
    }

    /// Run every `post_send` in registration order.
    pub fn post_send(&self, message: &Message<T>, channel: &str, sent: bool) {
        for interceptor in self.interceptors.iter() {
            interceptor.post_send(message, channel, sent);
        }
    }

    /// Run every `pre_receive` in order. Stops at the first veto.
    pub fn pre_receive(&self, channel: &str) -> bool {
        for (position, interceptor) in self.interceptors.iter().enumerate() {
            if !interceptor.pre_receive(channel) {
                debug!(channel, position, "Receive vetoed by interceptor");
                return false;
            }
        }
        true
    }

    /// Run every `post_receive` in order. Stops when one drops the message.
    pub fn post_receive(&self, message: Message<T>, channel: &str) -> Option<Message<T>> {
        let mut current = message;
        for (position, interceptor) in self.interceptors.iter().enumerate() {
            let id = current.id();
            match interceptor.post_receive(current, channel) {
                Some(next) => current = next,
                None => {
                    debug!(
                        channel,
                        position,
                        message_id = %id,
                        "Received message dropped by interceptor"
                    );
                    return None;
                }
            }
        }
        Some(current)
    }
}

/// Logs every hook at `trace` level. Never vetoes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingInterceptor;

impl<T> ChannelInterceptor<T> for TracingInterceptor {
    fn pre_send(&self, message: Message<T>, channel: &str) -> Option<Message<T>> {
        trace!(channel, message_id = %message.id(), "pre-send");
        Some(message)
    }

    fn post_send(&self, message: &Message<T>, channel: &str, sent: bool) {
        trace!(channel, message_id = %message.id(), sent, "post-send");
    }

    fn pre_receive(&self, channel: &str) -> bool {
        trace!(channel, "pre-receive");
        true
    }

    fn post_receive(&self, message: Message<T>, channel: &str) -> Option<Message<T>> {
        trace!(channel, message_id = %message.id(), "post-receive");
        Some(message)
    }
}

/// Vetoes any send whose message is rejected by one of its selectors.
pub struct MessageSelectingInterceptor<T> {
    selectors: Vec<Arc<dyn MessageSelector<T>>>,
}

impl<T> MessageSelectingInterceptor<T> {
    #[must_use]
    pub fn new(selectors: Vec<Arc<dyn MessageSelector<T>>>) -> Self {
        Self { selectors }
    }
}

impl<T> ChannelInterceptor<T> for MessageSelectingInterceptor<T> {
    fn pre_send(&self, message: Message<T>, _channel: &str) -> Option<Message<T>> {
        self.selectors
            .iter()
            .all(|selector| selector.accept(&message))
            .then_some(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Appends its tag to a shared log on every hook.
    struct Tagging {
        tag: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        veto_send: bool,
    }

    impl ChannelInterceptor<u32> for Tagging {
        fn pre_send(&self, message: Message<u32>, _channel: &str) -> Option<Message<u32>> {
            self.log.lock().push(format!("pre:{}", self.tag));
            (!self.veto_send).then(|| message.with_header(self.tag, true))
        }

        fn post_send(&self, _message: &Message<u32>, _channel: &str, sent: bool) {
            self.log.lock().push(format!("post:{}:{sent}", self.tag));
        }
    }

    fn tagging(tag: &'static str, log: &Arc<Mutex<Vec<String>>>, veto_send: bool) -> Arc<Tagging> {
        Arc::new(Tagging {
            tag,
            log: Arc::clone(log),
            veto_send,
        })
    }

    #[test]
    fn test_pre_send_runs_in_order_and_transforms() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain: InterceptorChain<u32> = InterceptorChain::new();
        chain.add(tagging("a", &log, false));
        chain.add(tagging("b", &log, false));

        let list = chain.snapshot();
        let message = list.pre_send(Message::new(1), "ch").expect("not vetoed");
        list.post_send(&message, "ch", true);

        assert!(message.headers().get("a").is_some());
        assert!(message.headers().get("b").is_some());
        assert_eq!(*log.lock(), vec!["pre:a", "pre:b", "post:a:true", "post:b:true"]);
    }

    #[test]
    fn test_veto_short_circuits() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain: InterceptorChain<u32> = InterceptorChain::new();
        chain.add(tagging("a", &log, true));
        chain.add(tagging("b", &log, false));

        assert!(chain.snapshot().pre_send(Message::new(1), "ch").is_none());
        assert_eq!(*log.lock(), vec!["pre:a"]);
    }

    #[test]
    fn test_snapshot_is_stable() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain: InterceptorChain<u32> = InterceptorChain::new();
        chain.add(tagging("a", &log, false));
        let before = chain.snapshot();
        chain.add(tagging("b", &log, false));

        assert_eq!(before.len(), 1);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.snapshot().len(), 2);
    }

    #[test]
    fn test_selecting_interceptor() {
        let small: Arc<dyn MessageSelector<u32>> = Arc::new(|m: &Message<u32>| *m.payload() < 10);
        let interceptor = MessageSelectingInterceptor::new(vec![small]);
        assert!(interceptor.pre_send(Message::new(3), "ch").is_some());
        assert!(interceptor.pre_send(Message::new(30), "ch").is_none());
    }

    #[test]
    fn test_tracing_interceptor_passes_through() {
        let tracing: Arc<dyn ChannelInterceptor<u32>> = Arc::new(TracingInterceptor);
        let chain = InterceptorChain::from(vec![tracing]);
        let list = chain.snapshot();
        let message = Message::new(7);
        let id = message.id();
        assert!(list.pre_receive("ch"));
        let received = list.post_receive(message, "ch").expect("passed through");
        assert_eq!(received.id(), id);
    }
}
