//! Pagination controller.
//!
//! A paginated reply carries home / previous / next buttons whose tokens
//! hold the command's options plus the page window to show when pressed.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{DecodeResult, EncodeResult};
use crate::token::{ActionTag, ButtonState, Envelope, StateToken};
use crate::types::{Component, button_style};

/// A window into a result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Rows per page, always positive.
    pub limit: u32,
    /// Index of the first row.
    pub offset: u32,
}

impl Page {
    /// The first page of `limit` rows.
    #[must_use]
    pub const fn first(limit: u32) -> Self {
        Self { limit, offset: 0 }
    }

    /// The first page with the same limit.
    #[must_use]
    pub const fn home(self) -> Self {
        Self::first(self.limit)
    }

    /// The preceding page, clamped at offset zero.
    #[must_use]
    pub const fn prev(self) -> Self {
        Self {
            limit: self.limit,
            offset: self.offset.saturating_sub(self.limit),
        }
    }

    /// The following page.
    #[must_use]
    pub const fn next(self) -> Self {
        Self {
            limit: self.limit,
            offset: self.offset.saturating_add(self.limit),
        }
    }

    /// Whether a full page precedes this one.
    #[must_use]
    pub const fn has_prev(self) -> bool {
        self.offset >= self.limit
    }
}

/// Pagination state: the command's options plus the current window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cursor<O> {
    /// Options the command was invoked with.
    pub options: O,
    /// Current window.
    pub page: Page,
}

impl<O> Cursor<O> {
    /// A cursor at the first page.
    pub fn first(options: O, limit: u32) -> Self {
        Self {
            options,
            page: Page::first(limit),
        }
    }
}

impl<O: Clone> Cursor<O> {
    fn at(&self, page: Page) -> Self {
        Self {
            options: self.options.clone(),
            page,
        }
    }
}

impl<O: Serialize + DeserializeOwned> ButtonState for Cursor<O> {
    const TAG: ActionTag = ActionTag::Paginate;
}

/// Follow-up state: options to run a command's fresh path with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowUp<O> {
    /// Options the target command will see.
    pub options: O,
}

impl<O: Serialize + DeserializeOwned> ButtonState for FollowUp<O> {
    const TAG: ActionTag = ActionTag::FollowUp;
}

/// The decoded state of a pressed button.
#[derive(Debug, Clone, PartialEq)]
pub enum Continuation<O> {
    /// Show another page.
    Paginate(Cursor<O>),
    /// Run the fresh path with these options.
    FollowUp(FollowUp<O>),
}

impl<O: Serialize + DeserializeOwned> Continuation<O> {
    /// Decode an envelope according to its tag.
    ///
    /// # Errors
    ///
    /// Fails when the fingerprint does not match or the payload does not
    /// decode.
    pub fn open(envelope: &Envelope) -> DecodeResult<Self> {
        match envelope.tag() {
            ActionTag::Paginate => envelope.open().map(Self::Paginate),
            ActionTag::FollowUp => envelope.open().map(Self::FollowUp),
        }
    }
}

/// One navigation button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    /// State token the button carries.
    pub token: StateToken,
    /// Greyed out when the target page is not meaningful.
    pub disabled: bool,
}

/// The home / previous / next button triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageControls {
    /// Jump to offset zero.
    pub home: Control,
    /// Step back one page.
    pub prev: Control,
    /// Step forward one page.
    pub next: Control,
}

impl PageControls {
    /// Derive the controls for `cursor`.
    ///
    /// Returns `None` when the result fits on a single first page. `route`
    /// is embedded in every token and should name the owning command when
    /// it is not the command that created the message.
    ///
    /// # Errors
    ///
    /// Propagates any [`EncodeError`](crate::EncodeError) raised while
    /// building the tokens.
    pub fn derive<O>(
        cursor: &Cursor<O>,
        has_next: bool,
        route: Option<&str>,
    ) -> EncodeResult<Option<Self>>
    where
        O: Serialize + DeserializeOwned + Clone,
    {
        let page = cursor.page;
        if page.offset == 0 && !has_next {
            return Ok(None);
        }

        let control = |target: Page, disabled: bool| -> EncodeResult<Control> {
            Ok(Control {
                token: StateToken::encode(&cursor.at(target), route)?,
                disabled,
            })
        };

        Ok(Some(Self {
            home: control(page.home(), page.offset == 0)?,
            prev: control(page.prev(), !page.has_prev())?,
            next: control(page.next(), !has_next)?,
        }))
    }

    /// Render as an action row of three buttons.
    #[must_use]
    pub fn into_action_row(self) -> Component {
        let button = |label: &str, control: Control| {
            Component::button(button_style::PRIMARY, label, control.token)
                .disabled(control.disabled)
        };
        Component::action_row(vec![
            button("⏮", self.home),
            button("⏴", self.prev),
            button("⏵", self.next),
        ])
    }
}
