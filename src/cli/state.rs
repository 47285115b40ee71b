//! Screen navigation as an explicit state machine.
//!
//! The shell is always on exactly one [`Screen`]. Commands move between screens by
//! applying a [`Transition`] to the [`Navigator`], which keeps the back stack.

use std::fmt;

use uuid::Uuid;

/// Top-level areas reachable from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Expenses,
    Team,
    Fleet,
    Cash,
    Contract,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Expenses,
        Section::Team,
        Section::Fleet,
        Section::Cash,
        Section::Contract,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "expenses" | "expense" => Some(Section::Expenses),
            "team" | "workers" => Some(Section::Team),
            "fleet" | "vehicles" => Some(Section::Fleet),
            "cash" => Some(Section::Cash),
            "contract" => Some(Section::Contract),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Section::Expenses => "expenses",
            Section::Team => "team",
            Section::Fleet => "fleet",
            Section::Cash => "cash",
            Section::Contract => "contract",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Expenses,
    Team,
    Worker(Uuid),
    Fleet,
    Vehicle(Uuid),
    Cash,
    Contract,
}

impl Screen {
    pub fn of(section: Section) -> Self {
        match section {
            Section::Expenses => Screen::Expenses,
            Section::Team => Screen::Team,
            Section::Fleet => Screen::Fleet,
            Section::Cash => Screen::Cash,
            Section::Contract => Screen::Contract,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Screen::Home => "home",
            Screen::Expenses => "expenses",
            Screen::Team => "team",
            Screen::Worker(_) => "worker",
            Screen::Fleet => "fleet",
            Screen::Vehicle(_) => "vehicle",
            Screen::Cash => "cash",
            Screen::Contract => "contract",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Open(Section),
    SelectWorker(Uuid),
    SelectVehicle(Uuid),
    Back,
    Home,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("workers can only be opened from the team screen (currently on {0})")]
    WorkerOutsideTeam(Screen),
    #[error("vehicles can only be opened from the fleet screen (currently on {0})")]
    VehicleOutsideFleet(Screen),
    #[error("already on the home screen")]
    NothingToGoBackTo,
}

#[derive(Debug, Clone)]
pub struct Navigator {
    current: Screen,
    history: Vec<Screen>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            current: Screen::Home,
            history: Vec::new(),
        }
    }

    pub fn current(&self) -> Screen {
        self.current
    }

    /// Screens behind the current one, oldest first.
    pub fn trail(&self) -> &[Screen] {
        &self.history
    }

    pub fn apply(&mut self, transition: Transition) -> Result<Screen, NavigationError> {
        let next = match transition {
            Transition::Open(section) => Screen::of(section),
            Transition::SelectWorker(id) => match self.current {
                Screen::Team => Screen::Worker(id),
                other => return Err(NavigationError::WorkerOutsideTeam(other)),
            },
            Transition::SelectVehicle(id) => match self.current {
                Screen::Fleet => Screen::Vehicle(id),
                other => return Err(NavigationError::VehicleOutsideFleet(other)),
            },
            Transition::Back => {
                self.current = self
                    .history
                    .pop()
                    .ok_or(NavigationError::NothingToGoBackTo)?;
                return Ok(self.current);
            }
            Transition::Home => {
                self.history.clear();
                self.current = Screen::Home;
                return Ok(self.current);
            }
        };
        if next != self.current {
            self.history.push(self.current);
            self.current = next;
        }
        Ok(self.current)
    }

    /// Drops a worker or vehicle screen whose subject no longer exists.
    pub fn forget(&mut self, id: Uuid) {
        let refers = |screen: &Screen| matches!(screen, Screen::Worker(x) | Screen::Vehicle(x) if *x == id);
        self.history.retain(|screen| !refers(screen));
        if refers(&self.current) {
            self.current = self.history.pop().unwrap_or(Screen::Home);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_home_and_opens_sections() {
        let mut nav = Navigator::new();
        assert_eq!(nav.current(), Screen::Home);
        for section in Section::ALL {
            nav.apply(Transition::Home).unwrap();
            assert_eq!(nav.apply(Transition::Open(section)).unwrap(), Screen::of(section));
            assert_eq!(nav.trail(), &[Screen::Home]);
        }
    }

    #[test]
    fn worker_only_from_team() {
        let mut nav = Navigator::new();
        let id = Uuid::new_v4();
        assert_eq!(
            nav.apply(Transition::SelectWorker(id)),
            Err(NavigationError::WorkerOutsideTeam(Screen::Home))
        );
        nav.apply(Transition::Open(Section::Team)).unwrap();
        assert_eq!(nav.apply(Transition::SelectWorker(id)).unwrap(), Screen::Worker(id));
        assert!(matches!(
            nav.apply(Transition::SelectWorker(Uuid::new_v4())),
            Err(NavigationError::WorkerOutsideTeam(Screen::Worker(_)))
        ));
    }

    #[test]
    fn vehicle_only_from_fleet() {
        let mut nav = Navigator::new();
        nav.apply(Transition::Open(Section::Team)).unwrap();
        assert!(nav.apply(Transition::SelectVehicle(Uuid::new_v4())).is_err());
        nav.apply(Transition::Open(Section::Fleet)).unwrap();
        assert!(nav.apply(Transition::SelectVehicle(Uuid::new_v4())).is_ok());
    }

    #[test]
    fn back_walks_the_stack_and_stops_at_home() {
        let mut nav = Navigator::new();
        let id = Uuid::new_v4();
        nav.apply(Transition::Open(Section::Team)).unwrap();
        nav.apply(Transition::SelectWorker(id)).unwrap();
        assert_eq!(nav.apply(Transition::Back).unwrap(), Screen::Team);
        assert_eq!(nav.apply(Transition::Back).unwrap(), Screen::Home);
        assert_eq!(
            nav.apply(Transition::Back),
            Err(NavigationError::NothingToGoBackTo)
        );
    }

    #[test]
    fn reopening_current_screen_does_not_grow_history() {
        let mut nav = Navigator::new();
        nav.apply(Transition::Open(Section::Cash)).unwrap();
        nav.apply(Transition::Open(Section::Cash)).unwrap();
        assert_eq!(nav.trail().len(), 1);
    }

    #[test]
    fn forget_leaves_removed_subject() {
        let mut nav = Navigator::new();
        let id = Uuid::new_v4();
        nav.apply(Transition::Open(Section::Fleet)).unwrap();
        nav.apply(Transition::SelectVehicle(id)).unwrap();
        nav.forget(id);
        assert_eq!(nav.current(), Screen::Fleet);
    }
}
