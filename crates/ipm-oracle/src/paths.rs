//! Parameter addresses of the well model and the network model.
//!
//! These strings are the engine's contract; the tuners only ever build them
//! through this module.

pub mod prosper {
    pub const MATCH_COUNT: &str = "PROSPER.ANL.VMT.DATA.COUNT";
    pub const MATCH_CALC: &str = "PROSPER.ANL.VMT.CALC";
    pub const UVALUE_CALC: &str = "PROSPER.ANL.VMT.UVAL";
    pub const ADJUST_RESET: &str = "PROSPER.ANL.VMT.ADJUSTRESET(1,5)";
    pub const ADJUST_CALC: &str = "PROSPER.ANL.VMT.ADJUSTCALC(1)";
    pub const ADJUST_PI: &str = "PROSPER.ANL.VMT.ADJUSTPI(1)";
    pub const SYSTEM_CALC: &str = "PROSPER.ANL.SYS.CALC";

    pub const HEAT_TRANSFER: &str = "PROSPER.SIN.EQP.Geo.Htc";
    pub const PRODUCTIVITY_INDEX: &str = "PROSPER.SIN.IPR.Single.Pindex";
    pub const RESERVOIR_PRESSURE: &str = "PROSPER.SIN.IPR.Single.Pres";
    pub const GAS_LIFT_RATE: &str = "PROSPER.SIN.GLF.GLRate";

    pub const SYSTEM_WATERCUT: &str = "PROSPER.ANL.SYS.WC";
    pub const SYSTEM_GOR: &str = "PROSPER.ANL.SYS.GOR";
    pub const SYSTEM_TUBING: &str = "PROSPER.ANL.SYS.TubingLabel";
    pub const SYSTEM_WHP: &str = "PROSPER.ANL.SYS.Pres";

    pub const SOLVED_LIQUID_RATE: &str = "PROSPER.OUT.SYS.Results[0].Sol.LiqRate";
    pub const SOLVED_GAUGE_PRESSURE: &str = "PROSPER.OUT.SYS.Results[0].Sol.GaugeP[0]";

    /// Column of the VLP match table.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum MatchField {
        Date,
        Label,
        Gor,
        GorFree,
        Rate,
        Watercut,
        WellheadPressure,
        WellheadTemperature,
        GaugePressure,
        GaugeDepth,
        ReservoirPressure,
        GasLiftRate,
        Enable,
        UValue,
        AmendedPi,
    }

    impl MatchField {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Date => "Date",
                Self::Label => "Label",
                Self::Gor => "GOR",
                Self::GorFree => "GORFree",
                Self::Rate => "Rate",
                Self::Watercut => "WC",
                Self::WellheadPressure => "THpres",
                Self::WellheadTemperature => "THtemp",
                Self::GaugePressure => "Gpres",
                Self::GaugeDepth => "Gdepth",
                Self::ReservoirPressure => "Pres",
                Self::GasLiftRate => "Irate",
                Self::Enable => "ENABLE",
                Self::UValue => "Uvalue",
                Self::AmendedPi => "PIamend",
            }
        }
    }

    /// Columns carried over when the match table history is shifted down.
    pub const HISTORY_FIELDS: [MatchField; 12] = [
        MatchField::Date,
        MatchField::Label,
        MatchField::Gor,
        MatchField::GorFree,
        MatchField::Rate,
        MatchField::Watercut,
        MatchField::WellheadPressure,
        MatchField::WellheadTemperature,
        MatchField::GaugePressure,
        MatchField::GaugeDepth,
        MatchField::ReservoirPressure,
        MatchField::GasLiftRate,
    ];

    pub fn match_field(row: usize, field: MatchField) -> String {
        format!("PROSPER.ANL.VMT.Data[{row}].{}", field.as_str())
    }

    pub fn correlation_label(correlation: &str) -> String {
        format!("PROSPER.ANL.VMT.CorrLabel[{{{correlation}}}]")
    }

    /// Correlation parameter `index` (0 = gravity, 1 = friction).
    pub fn correlation_parameter(correlation: &str, index: usize) -> String {
        format!("PROSPER.ANL.COR.Corr[{{{correlation}}}].A[{index}]")
    }

    pub mod vlp {
        pub const PIPE_LABEL: &str = "PROSPER.ANL.VLP.PipeLabel";
        pub const TUBING_LABEL: &str = "PROSPER.ANL.VLP.TubingLabel";
        pub const RATE_FIRST: &str = "PROSPER.ANL.VLP.Sens.Gen.First";
        pub const RATE_LAST: &str = "PROSPER.ANL.VLP.Sens.Gen.Last";
        pub const RATE_NUMBER: &str = "PROSPER.ANL.VLP.Sens.Gen.Number";
        pub const RATE_METHOD: &str = "PROSPER.ANL.VLP.Sens.Gen.Method";
        pub const GENERATE_RATES: &str = "PROSPER.ANL.VLP.GENRATES";
        pub const CALC: &str = "PROSPER.ANL.VLP.CALC";
        pub const EXPORT_FILE: &str = "PROSPER.ANL.VLP.EXP.File";
        pub const EXPORT_TYPE: &str = "PROSPER.ANL.VLP.EXP.ExtType";
        pub const EXPORT: &str = "PROSPER.ANL.VLP.EXPORTBYEXT";

        pub fn sensitivity_variable(slot: usize) -> String {
            format!("PROSPER.ANL.VLP.Sens.SensDB.Vars[{slot}]")
        }

        pub fn sensitivity_generator(variable: u32, field: &str) -> String {
            format!("PROSPER.ANL.VLP.Sens.SensDB.Sens[{variable}].Gen.{field}")
        }

        pub fn sensitivity_calc(variable: u32) -> String {
            format!("PROSPER.ANL.VLP.Sens.SensDB.Sens[{variable}].Calc")
        }
    }
}

pub mod gap {
    pub const LAST_COMMAND_RETURN: &str = "GAP.LASTCMDRET";
    pub const MAX_GAS: &str = "GAP.MOD[{PROD}].MaxQgas";

    const MODULE: &str = "GAP.MOD[{PROD}]";
    const MODULE_SHORT: &str = "MOD[{PROD}]";

    pub fn solve_network(optimize: bool) -> String {
        format!("GAP.SOLVENETWORK({})", u8::from(optimize))
    }

    /// Matching coefficient `index` (0 = gravity, 1 = friction) of a pipe.
    pub fn pipe_coefficient(pipe: &str, index: usize) -> String {
        format!("{MODULE}.PIPE[{{{pipe}}}].Matching.AVALS[{{Hydro2P}}][{index}]")
    }

    pub fn joint_pressure(joint: &str) -> String {
        format!("{MODULE}.JOINT[{{{joint}}}].SolverResults[0].Pres")
    }

    pub fn joint(joint: &str) -> String {
        format!("{MODULE}.JOINT[{{{joint}}}]")
    }

    pub fn well(well: &str) -> String {
        format!("{MODULE}.WELL[{{{well}}}]")
    }

    /// Mask or unmask command for a network entity built by `joint` or `well`.
    pub fn mask_command(entity: &str, masked: bool) -> String {
        if masked {
            format!("{entity}.MASK()")
        } else {
            format!("{entity}.UNMASK()")
        }
    }

    /// Mask state flag kept alongside an entity by in-memory engines.
    pub fn mask_flag(entity: &str) -> String {
        format!("{entity}.Masked")
    }

    pub fn vlp_import(well: &str, table: &str) -> String {
        format!("GAP.VLPIMPORT({MODULE_SHORT}.WELL[{{{well}}}], \"{table}\")")
    }

    pub fn ipr_field(well: &str, field: &str) -> String {
        format!("{MODULE}.WELL[{{{well}}}].IPR[0].{field}")
    }

    pub fn gas_lift_value(well: &str) -> String {
        format!("{MODULE}.WELL[{{{well}}}].AlqValue")
    }

    pub fn well_result(well: &str, field: &str) -> String {
        format!("{MODULE}.WELL[{{{well}}}].SolverResults[0].{field}")
    }

    /// Inline choke of a well; chokes are named after the well with a `CK` suffix.
    pub fn choke(well: &str, field: &str) -> String {
        format!("{MODULE}.INLCHK[{{{well}CK}}].{field}")
    }

    pub fn injection_rate(joint: &str) -> String {
        format!("{MODULE}.INLINJ[{{{joint}}}].Rate")
    }

    pub fn separator_pressure(joint: &str) -> String {
        format!("{MODULE}.SEP[{{{joint}}}].SolverPres[0]")
    }

    pub mod ipr {
        pub const PI: &str = "PI";
        pub const RESERVOIR_PRESSURE: &str = "ResPres";
        pub const WATERCUT: &str = "WCT";
        pub const GOR: &str = "GOR";
    }

    pub mod result {
        pub const OIL_RATE: &str = "OilRate";
        pub const WATER_RATE: &str = "WatRate";
        pub const GAS_RATE: &str = "GasRate";
        pub const WELLHEAD_PRESSURE: &str = "Pres";
        pub const GAUGE_PRESSURE: &str = "GaugePressure[0]";
        pub const GAS_INJECTED: &str = "Qgin";
    }

    pub mod choke_field {
        pub const DP_VALUE: &str = "DPControlValue";
        pub const DP_CONTROL: &str = "DPControl";
        pub const DIAMETER_MIN: &str = "ChokeDiameterMin";
        pub const DIAMETER_MAX: &str = "ChokeDiameterMax";
    }
}
