//! Method classification from member attributes.

use std::fmt;

use alfix_syntax::{SyntaxKind, SyntaxNode};

/// Role of a procedure or trigger, derived from its attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodType {
    /// Plain procedure or trigger.
    Method,
    /// `[Test]`
    Test,
    /// `[ConfirmHandler]`
    ConfirmHandler,
    /// `[FilterPageHandler]`
    FilterPageHandler,
    /// `[HyperlinkHandler]`
    HyperlinkHandler,
    /// `[MessageHandler]`
    MessageHandler,
    /// `[ModalPageHandler]`
    ModalPageHandler,
    /// `[PageHandler]`
    PageHandler,
    /// `[ReportHandler]`
    ReportHandler,
    /// `[RequestPageHandler]`
    RequestPageHandler,
    /// `[SendNotificationHandler]`
    SendNotificationHandler,
    /// `[RecallNotificationHandler]`
    RecallNotificationHandler,
    /// `[SessionSettingsHandler]`
    SessionSettingsHandler,
    /// `[StrMenuHandler]`
    StrMenuHandler,
    /// `[EventSubscriber(...)]`
    EventSubscriber,
    /// `[BusinessEvent(...)]`
    BusinessEventPublisher,
    /// `[IntegrationEvent(...)]`
    IntegrationEventPublisher,
}

/// Normalized attribute prefixes in priority order; the first match wins.
const ATTRIBUTE_TABLE: &[(&str, MethodType)] = &[
    ("test", MethodType::Test),
    ("confirmhandler", MethodType::ConfirmHandler),
    ("filterpagehandler", MethodType::FilterPageHandler),
    ("hyperlinkhandler", MethodType::HyperlinkHandler),
    ("messagehandler", MethodType::MessageHandler),
    ("modalpagehandler", MethodType::ModalPageHandler),
    ("pagehandler", MethodType::PageHandler),
    ("reporthandler", MethodType::ReportHandler),
    ("requestpagehandler", MethodType::RequestPageHandler),
    ("sendnotificationhandler", MethodType::SendNotificationHandler),
    ("recallnotificationhandler", MethodType::RecallNotificationHandler),
    ("sessionsettingshandler", MethodType::SessionSettingsHandler),
    ("strmenuhandler", MethodType::StrMenuHandler),
    ("eventsubscriber", MethodType::EventSubscriber),
    ("businessevent", MethodType::BusinessEventPublisher),
    ("integrationevent", MethodType::IntegrationEventPublisher),
];

impl MethodType {
    /// Returns `true` for business and integration event publishers.
    #[must_use]
    pub fn is_event_publisher(self) -> bool {
        matches!(
            self,
            Self::BusinessEventPublisher | Self::IntegrationEventPublisher
        )
    }

    /// Returns `true` if parameters may be added to a method of this type.
    ///
    /// Test methods, handlers and subscribers have fixed signatures.
    #[must_use]
    pub fn accepts_new_parameters(self) -> bool {
        self == Self::Method || self.is_event_publisher()
    }
}

impl fmt::Display for MethodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

fn normalize_attribute(text: &str) -> String {
    let text = text.trim_start();
    let text = text.strip_prefix('[').unwrap_or(text);
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Classifies a `MethodDeclaration` or `TriggerDeclaration` by its attributes.
///
/// # Panics
///
/// Panics when `method` is neither a procedure nor a trigger.
#[must_use]
pub fn classify(method: SyntaxNode<'_>) -> MethodType {
    assert!(
        method.kind().is_method_like(),
        "classify called on {:?}",
        method.kind()
    );

    let attributes: Vec<String> = method
        .children_of_kind(SyntaxKind::MemberAttribute)
        .map(|attribute| normalize_attribute(attribute.text()))
        .collect();

    ATTRIBUTE_TABLE
        .iter()
        .find(|(prefix, _)| attributes.iter().any(|a| a.starts_with(prefix)))
        .map_or(MethodType::Method, |&(_, method_type)| method_type)
}
