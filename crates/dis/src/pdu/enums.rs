use serde::{Deserialize, Serialize};

/// Declares a u8 backed enumeration that keeps unrecognised values around.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident = $value:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant,)+
            Unknown(u8),
        }

        impl From<u8> for $name {
            fn from(value: u8) -> Self {
                match value {
                    $($value => Self::$variant,)+
                    other => Self::Unknown(other),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> Self {
                match value {
                    $($name::$variant => $value,)+
                    $name::Unknown(other) => other,
                }
            }
        }
    };
}

wire_enum! {
    /// SISO-REF-010 Annex A
    pub enum PduType {
        Other = 0,
        EntityState = 1,
        Fire = 2,
        Detonation = 3,
        Collision = 4,
        ServiceRequest = 5,
        ResupplyOffer = 6,
        ResupplyReceived = 7,
        ResupplyCancel = 8,
        RepairComplete = 9,
        RepairResponse = 10,
        CreateEntity = 11,
        RemoveEntity = 12,
        StartResume = 13,
        StopFreeze = 14,
        Acknowledge = 15,
        ActionRequest = 16,
        ActionResponse = 17,
        DataQuery = 18,
        SetData = 19,
        Data = 20,
        EventReport = 21,
        Comment = 22,
        ElectromagneticEmission = 23,
        Designator = 24,
        Transmitter = 25,
        Signal = 26,
        Receiver = 27,
        EntityStateUpdate = 67,
    }
}

wire_enum! {
    pub enum ProtocolFamily {
        Other = 0,
        EntityInformation = 1,
        Warfare = 2,
        Logistics = 3,
        RadioCommunications = 4,
        SimulationManagement = 5,
        DistributedEmissionRegeneration = 6,
    }
}

impl PduType {
    pub fn family(self) -> ProtocolFamily {
        match self {
            PduType::EntityState | PduType::EntityStateUpdate | PduType::Collision => {
                ProtocolFamily::EntityInformation
            }
            PduType::Fire | PduType::Detonation => ProtocolFamily::Warfare,
            PduType::ServiceRequest
            | PduType::ResupplyOffer
            | PduType::ResupplyReceived
            | PduType::ResupplyCancel
            | PduType::RepairComplete
            | PduType::RepairResponse => ProtocolFamily::Logistics,
            PduType::CreateEntity
            | PduType::RemoveEntity
            | PduType::StartResume
            | PduType::StopFreeze
            | PduType::Acknowledge
            | PduType::ActionRequest
            | PduType::ActionResponse
            | PduType::DataQuery
            | PduType::SetData
            | PduType::Data
            | PduType::EventReport
            | PduType::Comment => ProtocolFamily::SimulationManagement,
            PduType::ElectromagneticEmission | PduType::Designator => {
                ProtocolFamily::DistributedEmissionRegeneration
            }
            PduType::Transmitter | PduType::Signal | PduType::Receiver => {
                ProtocolFamily::RadioCommunications
            }
            PduType::Other | PduType::Unknown(_) => ProtocolFamily::Other,
        }
    }
}

wire_enum! {
    /// IEEE 1278.1 Annex E. Ids outside 1..=9 are carried but never extrapolated.
    pub enum DeadReckoningAlgorithm {
        Other = 0,
        Static = 1,
        Fpw = 2,
        Rpw = 3,
        Rvw = 4,
        Fvw = 5,
        Fpb = 6,
        Rpb = 7,
        Rvb = 8,
        Fvb = 9,
    }
}

impl Default for DeadReckoningAlgorithm {
    fn default() -> Self {
        DeadReckoningAlgorithm::Static
    }
}

impl DeadReckoningAlgorithm {
    pub fn is_supported(self) -> bool {
        (1..=9).contains(&u8::from(self))
    }

    /// Rotating algorithms integrate angular velocity into orientation.
    pub fn is_rotating(self) -> bool {
        matches!(
            self,
            DeadReckoningAlgorithm::Rpw
                | DeadReckoningAlgorithm::Rvw
                | DeadReckoningAlgorithm::Rpb
                | DeadReckoningAlgorithm::Rvb
        )
    }

    pub fn is_body_frame(self) -> bool {
        matches!(
            self,
            DeadReckoningAlgorithm::Fpb
                | DeadReckoningAlgorithm::Rpb
                | DeadReckoningAlgorithm::Rvb
                | DeadReckoningAlgorithm::Fvb
        )
    }

    pub fn uses_acceleration(self) -> bool {
        matches!(
            self,
            DeadReckoningAlgorithm::Rvw
                | DeadReckoningAlgorithm::Fvw
                | DeadReckoningAlgorithm::Rvb
                | DeadReckoningAlgorithm::Fvb
        )
    }
}

wire_enum! {
    pub enum DetonationResult {
        Other = 0,
        EntityImpact = 1,
        EntityProximateDetonation = 2,
        GroundImpact = 3,
        GroundProximateDetonation = 4,
        Detonation = 5,
        Dud = 6,
        HighExplosiveHitSmall = 7,
        HighExplosiveHitMedium = 8,
        HighExplosiveHitLarge = 9,
        ArmorPiercingHit = 10,
        DirtBlastSmall = 11,
        DirtBlastMedium = 12,
        DirtBlastLarge = 13,
        WaterBlastSmall = 14,
        WaterBlastMedium = 15,
        WaterBlastLarge = 16,
        AirHit = 17,
        BuildingHitSmall = 18,
        BuildingHitMedium = 19,
        BuildingHitLarge = 20,
        MineClearingLineCharge = 21,
        EnvironmentObjectImpact = 22,
        EnvironmentObjectProximateDetonation = 23,
        WaterImpact = 24,
        AirBurst = 25,
        KillWithFragmentType1 = 26,
        KillWithFragmentType2 = 27,
        KillWithFragmentType3 = 28,
        KillWithFragmentType1AfterFlyOutFailure = 29,
        KillWithFragmentType2AfterFlyOutFailure = 30,
        MissDueToFlyOutFailure = 31,
        MissDueToEndGameFailure = 32,
        MissDueToFlyOutAndEndGameFailure = 33,
    }
}

wire_enum! {
    pub enum StopFreezeReason {
        Other = 0,
        Recess = 1,
        Termination = 2,
        SystemFailure = 3,
        SecurityViolation = 4,
        EntityReconstruction = 5,
        StopForReset = 6,
        StopForRestart = 7,
        AbortTrainingReturnToTacticalOperations = 8,
    }
}

bitflags::bitflags! {
    /// What a frozen simulation keeps doing.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct FrozenBehavior: u8 {
        const RUN_SIMULATION_CLOCK = 1 << 0;
        const TRANSMIT_UPDATES = 1 << 1;
        const PROCESS_UPDATES = 1 << 2;
    }
}

/// Force affiliation. Values above 3 alternate friendly/opposing/neutral for further sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ForceId(pub u8);

impl ForceId {
    pub const OTHER: ForceId = ForceId(0);
    pub const FRIENDLY: ForceId = ForceId(1);
    pub const OPPOSING: ForceId = ForceId(2);
    pub const NEUTRAL: ForceId = ForceId(3);
}

/// Marking character set. Only ASCII is produced.
pub const MARKING_CHARACTER_SET_ASCII: u8 = 1;
