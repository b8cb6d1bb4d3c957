use crate::store::ScheduleStore;
use chrono::{Days, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new<S: AsRef<str>>(s: S) -> Self {
                Self(s.as_ref().to_owned())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifiant fort pour Staff
    StaffId
);
string_id!(
    /// Identifiant fort pour Role
    RoleId
);
string_id!(
    /// Identifiant fort pour LeaveRequest
    LeaveId
);
string_id!(
    /// Identifiant fort pour Shift. Toujours généré localement.
    ShiftId
);

impl ShiftId {
    pub fn random() -> Self {
        Self(format!("shift-{}", Uuid::new_v4()))
    }
}

impl LeaveId {
    pub fn random() -> Self {
        Self(format!("leave-{}", Uuid::new_v4()))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("day offset out of range (0..=6): {0}")]
    DayOutOfRange(u8),
    #[error("invalid day offset: {0}")]
    InvalidDay(String),
    #[error("invalid shift window (expected HH:MM-HH:MM): {0}")]
    InvalidWindow(String),
}

/// Membre de l'équipe support
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    pub id: StaffId,
    pub name: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub availability: String,
}

impl Staff {
    pub fn new<N: Into<String>>(id: StaffId, name: N) -> Self {
        Self {
            id,
            name: name.into(),
            skills: Vec::new(),
            availability: String::new(),
        }
    }
}

/// Rôle et besoin de couverture (agents requis par heure d'ouverture).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub required_agents: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveKind {
    Sick,
    Vacation,
    Medical,
    Personal,
    Emergency,
    Maternity,
    Paternity,
}

impl LeaveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveKind::Sick => "sick",
            LeaveKind::Vacation => "vacation",
            LeaveKind::Medical => "medical",
            LeaveKind::Personal => "personal",
            LeaveKind::Emergency => "emergency",
            LeaveKind::Maternity => "maternity",
            LeaveKind::Paternity => "paternity",
        }
    }
}

impl FromStr for LeaveKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sick" => Ok(LeaveKind::Sick),
            "vacation" => Ok(LeaveKind::Vacation),
            "medical" => Ok(LeaveKind::Medical),
            "personal" => Ok(LeaveKind::Personal),
            "emergency" => Ok(LeaveKind::Emergency),
            "maternity" => Ok(LeaveKind::Maternity),
            "paternity" => Ok(LeaveKind::Paternity),
            other => Err(format!("unknown leave type: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl FromStr for LeaveStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(LeaveStatus::Pending),
            "approved" => Ok(LeaveStatus::Approved),
            "rejected" => Ok(LeaveStatus::Rejected),
            other => Err(format!("unknown leave status: {other}")),
        }
    }
}

/// Demande de congé ; intervalle de dates inclusif [start_date, end_date].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: LeaveId,
    pub staff_id: StaffId,
    #[serde(rename = "type")]
    pub kind: LeaveKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: LeaveStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl LeaveRequest {
    pub fn new(
        staff_id: StaffId,
        kind: LeaveKind,
        start_date: NaiveDate,
        end_date: NaiveDate,
        status: LeaveStatus,
    ) -> Result<Self, String> {
        if end_date < start_date {
            return Err("leave end date must not precede start date".to_string());
        }
        Ok(Self {
            id: LeaveId::random(),
            staff_id,
            kind,
            start_date,
            end_date,
            status,
            reason: None,
        })
    }

    pub fn is_approved(&self) -> bool {
        self.status == LeaveStatus::Approved
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Fenêtres standard proposées par les règles par défaut.
pub const STANDARD_WINDOWS: [&str; 3] = ["09:00-18:00", "11:00-20:00", "12:00-21:00"];

/// Plage horaire d'un shift (heure murale, sans date).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShiftWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl ShiftWindow {
    pub fn standard() -> Vec<ShiftWindow> {
        STANDARD_WINDOWS
            .iter()
            .filter_map(|raw| raw.parse().ok())
            .collect()
    }
}

impl FromStr for ShiftWindow {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| ModelError::InvalidWindow(s.to_string()))?;
        match (parse_hhmm(start), parse_hhmm(end)) {
            (Some(start), Some(end)) if start != end => Ok(Self { start, end }),
            _ => Err(ModelError::InvalidWindow(s.to_string())),
        }
    }
}

impl fmt::Display for ShiftWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

/// Heure au format `HH:MM`.
pub fn parse_hhmm(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").ok()
}

mod hhmm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&t.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_hhmm(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid HH:MM time: {raw}")))
    }
}

/// Coordonnée d'une unité de couverture : (jour, rôle, fenêtre).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub day: u8,
    pub role_id: RoleId,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
}

impl Slot {
    pub fn new(day: u8, role_id: RoleId, window: ShiftWindow) -> Result<Self, ModelError> {
        if day > 6 {
            return Err(ModelError::DayOutOfRange(day));
        }
        Ok(Self {
            day,
            role_id,
            start_time: window.start,
            end_time: window.end,
        })
    }

    pub fn window(&self) -> ShiftWindow {
        ShiftWindow {
            start: self.start_time,
            end: self.end_time,
        }
    }
}

/// Affectation d'une personne à un rôle pour un jour et une fenêtre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: ShiftId,
    /// 0 = dimanche .. 6 = samedi, relatif à la semaine.
    pub day: u8,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub role_id: RoleId,
    pub staff_id: StaffId,
}

impl Shift {
    /// Nouveau shift avec un id frais.
    pub fn assign(slot: Slot, staff_id: StaffId) -> Self {
        Self {
            id: ShiftId::random(),
            day: slot.day,
            start_time: slot.start_time,
            end_time: slot.end_time,
            role_id: slot.role_id,
            staff_id,
        }
    }

    pub fn slot(&self) -> Slot {
        Slot {
            day: self.day,
            role_id: self.role_id.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }

    pub fn window(&self) -> ShiftWindow {
        ShiftWindow {
            start: self.start_time,
            end: self.end_time,
        }
    }

    pub fn occupies(&self, slot: &Slot) -> bool {
        self.day == slot.day
            && self.role_id == slot.role_id
            && self.start_time == slot.start_time
            && self.end_time == slot.end_time
    }

    /// Date absolue du shift pour une semaine commençant le dimanche `week_start`.
    pub fn date(&self, week_start: NaiveDate) -> Option<NaiveDate> {
        offset_date(week_start, self.day)
    }
}

pub(crate) fn offset_date(week_start: NaiveDate, offset: u8) -> Option<NaiveDate> {
    week_start.checked_add_days(Days::new(u64::from(offset)))
}

/// Ensemble ordonné de jours de la semaine (0..=6) à (re)générer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct DayOffsets(BTreeSet<u8>);

impl DayOffsets {
    pub fn new<I: IntoIterator<Item = u8>>(days: I) -> Result<Self, ModelError> {
        let set: BTreeSet<u8> = days.into_iter().collect();
        if let Some(bad) = set.iter().find(|d| **d > 6) {
            return Err(ModelError::DayOutOfRange(*bad));
        }
        if set.is_empty() {
            return Ok(Self::full_week());
        }
        Ok(Self(set))
    }

    pub fn full_week() -> Self {
        Self((0..=6).collect())
    }

    pub fn contains(&self, day: u8) -> bool {
        self.0.contains(&day)
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for DayOffsets {
    fn default() -> Self {
        Self::full_week()
    }
}

impl TryFrom<Vec<u8>> for DayOffsets {
    type Error = ModelError;

    fn try_from(days: Vec<u8>) -> Result<Self, Self::Error> {
        Self::new(days)
    }
}

impl From<DayOffsets> for Vec<u8> {
    fn from(days: DayOffsets) -> Self {
        days.0.into_iter().collect()
    }
}

impl FromStr for DayOffsets {
    type Err = ModelError;

    /// `"1,3,5"` ; chaîne vide = semaine complète.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let days = s
            .split(',')
            .map(str::trim)
            .filter(|chunk| !chunk.is_empty())
            .map(|chunk| {
                chunk
                    .parse::<u8>()
                    .map_err(|_| ModelError::InvalidDay(chunk.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(days)
    }
}

/// Tableau complet : équipe, rôles, congés et shifts de la semaine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    #[serde(default)]
    pub staff: Vec<Staff>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub leave_requests: Vec<LeaveRequest>,
    #[serde(default)]
    pub shifts: ScheduleStore,
}

impl Board {
    pub fn find_staff<'a>(&'a self, id: &StaffId) -> Option<&'a Staff> {
        self.staff.iter().find(|s| &s.id == id)
    }
    pub fn find_role<'a>(&'a self, id: &RoleId) -> Option<&'a Role> {
        self.roles.iter().find(|r| &r.id == id)
    }

    /// Ajoute ou remplace (même id) un membre.
    pub fn upsert_staff(&mut self, staff: Staff) {
        match self.staff.iter_mut().find(|s| s.id == staff.id) {
            Some(existing) => *existing = staff,
            None => self.staff.push(staff),
        }
    }

    pub fn upsert_role(&mut self, role: Role) {
        match self.roles.iter_mut().find(|r| r.id == role.id) {
            Some(existing) => *existing = role,
            None => self.roles.push(role),
        }
    }

    /// Supprime un membre et, en cascade, ses shifts et ses congés.
    /// Retourne le nombre de shifts supprimés, `None` si le membre est inconnu.
    pub fn remove_staff(&mut self, id: &StaffId) -> Option<usize> {
        let pos = self.staff.iter().position(|s| &s.id == id)?;
        self.staff.remove(pos);
        self.leave_requests.retain(|l| &l.staff_id != id);
        Some(self.shifts.remove_staff(id))
    }

    /// Shifts posés sur un jour de congé approuvé (les éditions manuelles ne sont
    /// pas revalidées ; ceci sert de diagnostic).
    pub fn leave_conflicts(&self, week_start: NaiveDate) -> Vec<&Shift> {
        self.shifts
            .iter()
            .filter(|shift| {
                shift.date(week_start).is_some_and(|date| {
                    crate::leave::is_on_leave(&shift.staff_id, date, &self.leave_requests)
                })
            })
            .collect()
    }
}
