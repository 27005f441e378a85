//! STDF V4 record schemas.
//!
//! Every record type the renderer understands is a variant of [`RecordType`],
//! and each variant resolves to a `'static` [`RecordSchema`] holding the
//! ordered field names and their STDF type codes.

use std::fmt;

/// STDF primitive type of a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    U1,
    U2,
    U4,
    U8,
    I1,
    I2,
    I4,
    I8,
    R4,
    R8,
    C1,
    Cn,
    Bn,
    Dn,
    N1,
    B1,
    Vn,
}

impl ScalarType {
    pub fn code(self) -> &'static str {
        match self {
            ScalarType::U1 => "U1",
            ScalarType::U2 => "U2",
            ScalarType::U4 => "U4",
            ScalarType::U8 => "U8",
            ScalarType::I1 => "I1",
            ScalarType::I2 => "I2",
            ScalarType::I4 => "I4",
            ScalarType::I8 => "I8",
            ScalarType::R4 => "R4",
            ScalarType::R8 => "R8",
            ScalarType::C1 => "C1",
            ScalarType::Cn => "Cn",
            ScalarType::Bn => "Bn",
            ScalarType::Dn => "Dn",
            ScalarType::N1 => "N1",
            ScalarType::B1 => "B1",
            ScalarType::Vn => "Vn",
        }
    }

    /// Byte and nibble fields are shown as two hex digits.
    pub fn is_hex(self) -> bool {
        matches!(self, ScalarType::B1 | ScalarType::N1)
    }
}

/// Declared type of a record field: a single value or an array of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Scalar(ScalarType),
    Array(ScalarType),
}

impl FieldType {
    /// The STDF type code. Array codes use `x` in place of the count field.
    pub fn code(self) -> String {
        match self {
            FieldType::Scalar(t) => t.code().to_string(),
            FieldType::Array(t) => format!("kx{}", t.code()),
        }
    }

    pub fn storage_kind(self) -> StorageKind {
        match self {
            FieldType::Array(_) => StorageKind::Real,
            FieldType::Scalar(R4 | R8) => StorageKind::Real,
            FieldType::Scalar(U1 | U2 | U4 | U8 | I1 | I2 | I4 | I8 | B1 | Bn) => {
                StorageKind::Integer
            }
            FieldType::Scalar(C1 | Cn | Dn | N1 | Vn) => StorageKind::Text,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

/// Column affinity recorded by the pivot store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Integer,
    Real,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub ty: FieldType,
}

/// Field layout of one record type.
#[derive(Debug, PartialEq, Eq)]
pub struct RecordSchema {
    pub rec_type: RecordType,
    pub rec_typ: u8,
    pub rec_sub: u8,
    pub fields: &'static [FieldDef],
}

impl RecordSchema {
    pub fn name(&self) -> &'static str {
        self.rec_type.name()
    }

    pub fn field(&self, index: usize) -> Option<&'static FieldDef> {
        self.fields.get(index)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// Every STDF V4 record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordType {
    Far,
    Atr,
    Mir,
    Mrr,
    Pcr,
    Hbr,
    Sbr,
    Pmr,
    Pgr,
    Plr,
    Rdr,
    Sdr,
    Wir,
    Wrr,
    Wcr,
    Pir,
    Prr,
    Tsr,
    Ptr,
    Mpr,
    Ftr,
    Bps,
    Eps,
    Gdr,
    Dtr,
}

impl RecordType {
    pub const ALL: [RecordType; 25] = [
        RecordType::Far,
        RecordType::Atr,
        RecordType::Mir,
        RecordType::Mrr,
        RecordType::Pcr,
        RecordType::Hbr,
        RecordType::Sbr,
        RecordType::Pmr,
        RecordType::Pgr,
        RecordType::Plr,
        RecordType::Rdr,
        RecordType::Sdr,
        RecordType::Wir,
        RecordType::Wrr,
        RecordType::Wcr,
        RecordType::Pir,
        RecordType::Prr,
        RecordType::Tsr,
        RecordType::Ptr,
        RecordType::Mpr,
        RecordType::Ftr,
        RecordType::Bps,
        RecordType::Eps,
        RecordType::Gdr,
        RecordType::Dtr,
    ];

    /// Display name, e.g. `"Mpr"`.
    pub fn name(self) -> &'static str {
        match self {
            RecordType::Far => "Far",
            RecordType::Atr => "Atr",
            RecordType::Mir => "Mir",
            RecordType::Mrr => "Mrr",
            RecordType::Pcr => "Pcr",
            RecordType::Hbr => "Hbr",
            RecordType::Sbr => "Sbr",
            RecordType::Pmr => "Pmr",
            RecordType::Pgr => "Pgr",
            RecordType::Plr => "Plr",
            RecordType::Rdr => "Rdr",
            RecordType::Sdr => "Sdr",
            RecordType::Wir => "Wir",
            RecordType::Wrr => "Wrr",
            RecordType::Wcr => "Wcr",
            RecordType::Pir => "Pir",
            RecordType::Prr => "Prr",
            RecordType::Tsr => "Tsr",
            RecordType::Ptr => "Ptr",
            RecordType::Mpr => "Mpr",
            RecordType::Ftr => "Ftr",
            RecordType::Bps => "Bps",
            RecordType::Eps => "Eps",
            RecordType::Gdr => "Gdr",
            RecordType::Dtr => "Dtr",
        }
    }

    /// Case-insensitive lookup by name (`"MPR"`, `"Mpr"` and `"mpr"` all match).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }

    /// Lookup by the `REC_TYP`/`REC_SUB` header codes.
    pub fn from_codes(rec_typ: u8, rec_sub: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|t| {
            let schema = t.schema();
            schema.rec_typ == rec_typ && schema.rec_sub == rec_sub
        })
    }

    pub fn schema(self) -> &'static RecordSchema {
        match self {
            RecordType::Far => &FAR,
            RecordType::Atr => &ATR,
            RecordType::Mir => &MIR,
            RecordType::Mrr => &MRR,
            RecordType::Pcr => &PCR,
            RecordType::Hbr => &HBR,
            RecordType::Sbr => &SBR,
            RecordType::Pmr => &PMR,
            RecordType::Pgr => &PGR,
            RecordType::Plr => &PLR,
            RecordType::Rdr => &RDR,
            RecordType::Sdr => &SDR,
            RecordType::Wir => &WIR,
            RecordType::Wrr => &WRR,
            RecordType::Wcr => &WCR,
            RecordType::Pir => &PIR,
            RecordType::Prr => &PRR,
            RecordType::Tsr => &TSR,
            RecordType::Ptr => &PTR,
            RecordType::Mpr => &MPR,
            RecordType::Ftr => &FTR,
            RecordType::Bps => &BPS,
            RecordType::Eps => &EPS,
            RecordType::Gdr => &GDR,
            RecordType::Dtr => &DTR,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const fn s(name: &'static str, ty: ScalarType) -> FieldDef {
    FieldDef {
        name,
        ty: FieldType::Scalar(ty),
    }
}

const fn k(name: &'static str, ty: ScalarType) -> FieldDef {
    FieldDef {
        name,
        ty: FieldType::Array(ty),
    }
}

use ScalarType::*;

static FAR: RecordSchema = RecordSchema {
    rec_type: RecordType::Far,
    rec_typ: 0,
    rec_sub: 10,
    fields: &[s("CPU_TYPE", U1), s("STDF_VER", U1)],
};

static ATR: RecordSchema = RecordSchema {
    rec_type: RecordType::Atr,
    rec_typ: 0,
    rec_sub: 20,
    fields: &[s("MOD_TIM", U4), s("CMD_LINE", Cn)],
};

static MIR: RecordSchema = RecordSchema {
    rec_type: RecordType::Mir,
    rec_typ: 1,
    rec_sub: 10,
    fields: &[
        s("SETUP_T", U4),
        s("START_T", U4),
        s("STAT_NUM", U1),
        s("MODE_COD", C1),
        s("RTST_COD", C1),
        s("PROT_COD", C1),
        s("BURN_TIM", U2),
        s("CMOD_COD", C1),
        s("LOT_ID", Cn),
        s("PART_TYP", Cn),
        s("NODE_NAM", Cn),
        s("TSTR_TYP", Cn),
        s("JOB_NAM", Cn),
        s("JOB_REV", Cn),
        s("SBLOT_ID", Cn),
        s("OPER_NAM", Cn),
        s("EXEC_TYP", Cn),
        s("EXEC_VER", Cn),
        s("TEST_COD", Cn),
        s("TST_TEMP", Cn),
        s("USER_TXT", Cn),
        s("AUX_FILE", Cn),
        s("PKG_TYP", Cn),
        s("FAMLY_ID", Cn),
        s("DATE_COD", Cn),
        s("FACIL_ID", Cn),
        s("FLOOR_ID", Cn),
        s("PROC_ID", Cn),
        s("OPER_FRQ", Cn),
        s("SPEC_NAM", Cn),
        s("SPEC_VER", Cn),
        s("FLOW_ID", Cn),
        s("SETUP_ID", Cn),
        s("DSGN_REV", Cn),
        s("ENG_ID", Cn),
        s("ROM_COD", Cn),
        s("SERL_NUM", Cn),
        s("SUPR_NAM", Cn),
    ],
};

static MRR: RecordSchema = RecordSchema {
    rec_type: RecordType::Mrr,
    rec_typ: 1,
    rec_sub: 20,
    fields: &[
        s("FINISH_T", U4),
        s("DISP_COD", C1),
        s("USR_DESC", Cn),
        s("EXC_DESC", Cn),
    ],
};

static PCR: RecordSchema = RecordSchema {
    rec_type: RecordType::Pcr,
    rec_typ: 1,
    rec_sub: 30,
    fields: &[
        s("HEAD_NUM", U1),
        s("SITE_NUM", U1),
        s("PART_CNT", U4),
        s("RTST_CNT", U4),
        s("ABRT_CNT", U4),
        s("GOOD_CNT", U4),
        s("FUNC_CNT", U4),
    ],
};

static HBR: RecordSchema = RecordSchema {
    rec_type: RecordType::Hbr,
    rec_typ: 1,
    rec_sub: 40,
    fields: &[
        s("HEAD_NUM", U1),
        s("SITE_NUM", U1),
        s("HBIN_NUM", U2),
        s("HBIN_CNT", U4),
        s("HBIN_PF", C1),
        s("HBIN_NAM", Cn),
    ],
};

static SBR: RecordSchema = RecordSchema {
    rec_type: RecordType::Sbr,
    rec_typ: 1,
    rec_sub: 50,
    fields: &[
        s("HEAD_NUM", U1),
        s("SITE_NUM", U1),
        s("SBIN_NUM", U2),
        s("SBIN_CNT", U4),
        s("SBIN_PF", C1),
        s("SBIN_NAM", Cn),
    ],
};

static PMR: RecordSchema = RecordSchema {
    rec_type: RecordType::Pmr,
    rec_typ: 1,
    rec_sub: 60,
    fields: &[
        s("PMR_INDX", U2),
        s("CHAN_TYP", U2),
        s("CHAN_NAM", Cn),
        s("PHY_NAM", Cn),
        s("LOG_NAM", Cn),
        s("HEAD_NUM", U1),
        s("SITE_NUM", U1),
    ],
};

static PGR: RecordSchema = RecordSchema {
    rec_type: RecordType::Pgr,
    rec_typ: 1,
    rec_sub: 62,
    fields: &[
        s("GRP_INDX", U2),
        s("GRP_NAM", Cn),
        s("INDX_CNT", U2),
        k("PMR_INDX", U2),
    ],
};

static PLR: RecordSchema = RecordSchema {
    rec_type: RecordType::Plr,
    rec_typ: 1,
    rec_sub: 63,
    fields: &[
        s("GRP_CNT", U2),
        k("GRP_INDX", U2),
        k("GRP_MODE", U2),
        k("GRP_RADX", U1),
        k("PGM_CHAR", Cn),
        k("RTN_CHAR", Cn),
        k("PGM_CHAL", Cn),
        k("RTN_CHAL", Cn),
    ],
};

static RDR: RecordSchema = RecordSchema {
    rec_type: RecordType::Rdr,
    rec_typ: 1,
    rec_sub: 70,
    fields: &[s("NUM_BINS", U2), k("RTST_BIN", U2)],
};

static SDR: RecordSchema = RecordSchema {
    rec_type: RecordType::Sdr,
    rec_typ: 1,
    rec_sub: 80,
    fields: &[
        s("HEAD_NUM", U1),
        s("SITE_GRP", U1),
        s("SITE_CNT", U1),
        k("SITE_NUM", U1),
        s("HAND_TYP", Cn),
        s("HAND_ID", Cn),
        s("CARD_TYP", Cn),
        s("CARD_ID", Cn),
        s("LOAD_TYP", Cn),
        s("LOAD_ID", Cn),
        s("DIB_TYP", Cn),
        s("DIB_ID", Cn),
        s("CABL_TYP", Cn),
        s("CABL_ID", Cn),
        s("CONT_TYP", Cn),
        s("CONT_ID", Cn),
        s("LASR_TYP", Cn),
        s("LASR_ID", Cn),
        s("EXTR_TYP", Cn),
        s("EXTR_ID", Cn),
    ],
};

static WIR: RecordSchema = RecordSchema {
    rec_type: RecordType::Wir,
    rec_typ: 2,
    rec_sub: 10,
    fields: &[
        s("HEAD_NUM", U1),
        s("SITE_GRP", U1),
        s("START_T", U4),
        s("WAFER_ID", Cn),
    ],
};

static WRR: RecordSchema = RecordSchema {
    rec_type: RecordType::Wrr,
    rec_typ: 2,
    rec_sub: 20,
    fields: &[
        s("HEAD_NUM", U1),
        s("SITE_GRP", U1),
        s("FINISH_T", U4),
        s("PART_CNT", U4),
        s("RTST_CNT", U4),
        s("ABRT_CNT", U4),
        s("GOOD_CNT", U4),
        s("FUNC_CNT", U4),
        s("WAFER_ID", Cn),
        s("FABWF_ID", Cn),
        s("FRAME_ID", Cn),
        s("MASK_ID", Cn),
        s("USR_DESC", Cn),
        s("EXC_DESC", Cn),
    ],
};

static WCR: RecordSchema = RecordSchema {
    rec_type: RecordType::Wcr,
    rec_typ: 2,
    rec_sub: 30,
    fields: &[
        s("WAFR_SIZ", R4),
        s("DIE_HT", R4),
        s("DIE_WID", R4),
        s("WF_UNITS", U1),
        s("WF_FLAT", C1),
        s("CENTER_X", I2),
        s("CENTER_Y", I2),
        s("POS_X", C1),
        s("POS_Y", C1),
    ],
};

static PIR: RecordSchema = RecordSchema {
    rec_type: RecordType::Pir,
    rec_typ: 5,
    rec_sub: 10,
    fields: &[s("HEAD_NUM", U1), s("SITE_NUM", U1)],
};

static PRR: RecordSchema = RecordSchema {
    rec_type: RecordType::Prr,
    rec_typ: 5,
    rec_sub: 20,
    fields: &[
        s("HEAD_NUM", U1),
        s("SITE_NUM", U1),
        s("PART_FLG", B1),
        s("NUM_TEST", U2),
        s("HARD_BIN", U2),
        s("SOFT_BIN", U2),
        s("X_COORD", I2),
        s("Y_COORD", I2),
        s("TEST_T", U4),
        s("PART_ID", Cn),
        s("PART_TXT", Cn),
        s("PART_FIX", Bn),
    ],
};

static TSR: RecordSchema = RecordSchema {
    rec_type: RecordType::Tsr,
    rec_typ: 10,
    rec_sub: 30,
    fields: &[
        s("HEAD_NUM", U1),
        s("SITE_NUM", U1),
        s("TEST_TYP", C1),
        s("TEST_NUM", U4),
        s("EXEC_CNT", U4),
        s("FAIL_CNT", U4),
        s("ALRM_CNT", U4),
        s("TEST_NAM", Cn),
        s("SEQ_NAME", Cn),
        s("TEST_LBL", Cn),
        s("OPT_FLAG", B1),
        s("TEST_TIM", R4),
        s("TEST_MIN", R4),
        s("TEST_MAX", R4),
        s("TST_SUMS", R4),
        s("TST_SQRS", R4),
    ],
};

static PTR: RecordSchema = RecordSchema {
    rec_type: RecordType::Ptr,
    rec_typ: 15,
    rec_sub: 10,
    fields: &[
        s("TEST_NUM", U4),
        s("HEAD_NUM", U1),
        s("SITE_NUM", U1),
        s("TEST_FLG", B1),
        s("PARM_FLG", B1),
        s("RESULT", R4),
        s("TEST_TXT", Cn),
        s("ALARM_ID", Cn),
        s("OPT_FLAG", B1),
        s("RES_SCAL", I1),
        s("LLM_SCAL", I1),
        s("HLM_SCAL", I1),
        s("LO_LIMIT", R4),
        s("HI_LIMIT", R4),
        s("UNITS", Cn),
        s("C_RESFMT", Cn),
        s("C_LLMFMT", Cn),
        s("C_HLMFMT", Cn),
        s("LO_SPEC", R4),
        s("HI_SPEC", R4),
    ],
};

static MPR: RecordSchema = RecordSchema {
    rec_type: RecordType::Mpr,
    rec_typ: 15,
    rec_sub: 15,
    fields: &[
        s("TEST_NUM", U4),
        s("HEAD_NUM", U1),
        s("SITE_NUM", U1),
        s("TEST_FLG", B1),
        s("PARM_FLG", B1),
        s("RTN_ICNT", U2),
        s("RSLT_CNT", U2),
        k("RTN_STAT", N1),
        k("RTN_RSLT", R4),
        s("TEST_TXT", Cn),
        s("ALARM_ID", Cn),
        s("OPT_FLAG", B1),
        s("RES_SCAL", I1),
        s("LLM_SCAL", I1),
        s("HLM_SCAL", I1),
        s("LO_LIMIT", R4),
        s("HI_LIMIT", R4),
        s("START_IN", R4),
        s("INCR_IN", R4),
        k("RTN_INDX", U2),
        s("UNITS", Cn),
        s("UNITS_IN", Cn),
        s("C_RESFMT", Cn),
        s("C_LLMFMT", Cn),
        s("C_HLMFMT", Cn),
        s("LO_SPEC", R4),
        s("HI_SPEC", R4),
    ],
};

static FTR: RecordSchema = RecordSchema {
    rec_type: RecordType::Ftr,
    rec_typ: 15,
    rec_sub: 20,
    fields: &[
        s("TEST_NUM", U4),
        s("HEAD_NUM", U1),
        s("SITE_NUM", U1),
        s("TEST_FLG", B1),
        s("OPT_FLAG", B1),
        s("CYCL_CNT", U4),
        s("REL_VADR", U4),
        s("REPT_CNT", U4),
        s("NUM_FAIL", U4),
        s("XFAIL_AD", I4),
        s("YFAIL_AD", I4),
        s("VECT_OFF", I2),
        s("RTN_ICNT", U2),
        s("PGM_ICNT", U2),
        k("RTN_INDX", U2),
        k("RTN_STAT", N1),
        k("PGM_INDX", U2),
        k("PGM_STAT", N1),
        s("FAIL_PIN", Dn),
        s("VECT_NAM", Cn),
        s("TIME_SET", Cn),
        s("OP_CODE", Cn),
        s("TEST_TXT", Cn),
        s("ALARM_ID", Cn),
        s("PROG_TXT", Cn),
        s("RSLT_TXT", Cn),
        s("PATG_NUM", U1),
        s("SPIN_MAP", Dn),
    ],
};

static BPS: RecordSchema = RecordSchema {
    rec_type: RecordType::Bps,
    rec_typ: 20,
    rec_sub: 10,
    fields: &[s("SEQ_NAME", Cn)],
};

static EPS: RecordSchema = RecordSchema {
    rec_type: RecordType::Eps,
    rec_typ: 20,
    rec_sub: 20,
    fields: &[],
};

static GDR: RecordSchema = RecordSchema {
    rec_type: RecordType::Gdr,
    rec_typ: 50,
    rec_sub: 10,
    fields: &[s("GEN_DATA", Vn)],
};

static DTR: RecordSchema = RecordSchema {
    rec_type: RecordType::Dtr,
    rec_typ: 50,
    rec_sub: 30,
    fields: &[s("TEXT_DAT", Cn)],
};
