//! Status messages passed to the platform with the terminal transition.
//!
//! Component messages go out with this component only. Session messages are
//! also kept in session storage and shown once more by the last component,
//! where the platform turns the outgoing message into the session message.

/// Separator between messages in the outgoing string.
pub const MESSAGE_SEPARATOR: &str = ", ";

/// Messages added during one finalize.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageBook {
    component: Vec<String>,
    session: Vec<String>,
}

/// Result of aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedMessages {
    /// Updated session list, to be stored when non-empty
    pub session: Vec<String>,
    /// Joined outgoing message, if any
    pub outgoing: Option<String>,
}

impl MessageBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `text`; `persist` also adds it to the session list.
    pub fn add(&mut self, text: impl Into<String>, persist: bool) {
        let text = text.into();
        if persist {
            self.session.push(text.clone());
        }
        self.component.push(text);
    }

    /// Append `other`'s messages after this book's.
    pub fn merge(&mut self, other: MessageBook) {
        self.component.extend(other.component);
        self.session.extend(other.session);
    }

    pub fn component(&self) -> &[String] {
        &self.component
    }

    pub fn session(&self) -> &[String] {
        &self.session
    }

    /// Merge with the stored session list and build the outgoing message.
    ///
    /// `extra` are the messages given in the finalize options; they follow
    /// messages added at run time. On the last component the session list is
    /// placed ahead of the component's own messages.
    pub fn aggregate(
        self,
        stored_session: Vec<String>,
        extra: &[String],
        is_last_component: bool,
    ) -> AggregatedMessages {
        let session = unique_in_order(stored_session.into_iter().chain(self.session));

        let mut component = self.component;
        component.extend(extra.iter().cloned());
        if is_last_component && !session.is_empty() {
            component = unique_in_order(session.iter().cloned().chain(component));
        }

        let outgoing = (!component.is_empty()).then(|| component.join(MESSAGE_SEPARATOR));
        AggregatedMessages { session, outgoing }
    }
}

/// Drop repeats, keeping first occurrences in order.
pub fn unique_in_order<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
