//! Name Directory.
//!
//! Every address may record a display name for itself. Setting a name again
//! replaces it; there is no operation to clear one.

use crate::environment::RegistryEnvironment;
use crate::error::RegistryError;
use crate::types::Address;
use dapp_ledger_core::{event::Event, reducer::Reducer, transition::Transition};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// State of the name directory
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryState {
    names: BTreeMap<Address, String>,
}

impl DirectoryState {
    /// Creates an empty directory
    #[must_use]
    pub const fn new() -> Self {
        Self {
            names: BTreeMap::new(),
        }
    }

    /// Name recorded for `user`, if any
    #[must_use]
    pub fn name_of(&self, user: Address) -> Option<&str> {
        self.names.get(&user).map(String::as_str)
    }

    /// Number of addresses with a name
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no names have been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Commands accepted by the directory
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectoryCommand {
    /// Record a name for the caller
    SetName {
        /// Name to record; surrounding whitespace is dropped
        name: String,
        /// Caller
        caller: Address,
    },
}

/// Notifications emitted by the directory
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectoryEvent {
    /// A name was recorded
    NameSet {
        /// Whose name
        user: Address,
        /// The trimmed name
        name: String,
    },
}

impl Event for DirectoryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            Self::NameSet { .. } => "NameSet.v1",
        }
    }
}

/// Reducer for the name directory
#[derive(Clone, Debug, Default)]
pub struct DirectoryReducer;

impl DirectoryReducer {
    /// Creates a new `DirectoryReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for DirectoryReducer {
    type State = DirectoryState;
    type Command = DirectoryCommand;
    type Event = DirectoryEvent;
    type Reply = ();
    type Error = RegistryError;
    type Environment = RegistryEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        command: Self::Command,
        env: &Self::Environment,
    ) -> Result<Transition<(), DirectoryEvent>, RegistryError> {
        match command {
            DirectoryCommand::SetName { name, caller } => {
                let name = name.trim();
                env.check_label("Name", name)?;

                let event = DirectoryEvent::NameSet {
                    user: caller,
                    name: name.to_string(),
                };
                Self::apply(state, &event);
                Ok(Transition::emit((), event))
            }
        }
    }

    fn apply(state: &mut Self::State, event: &Self::Event) {
        match event {
            DirectoryEvent::NameSet { user, name } => {
                state.names.insert(*user, name.clone());
            }
        }
    }
}
