// ── Address-flag decoding ─────────────────────────────────────────────────────
//
// The host database stores per-address state in a 64-bit flag word:
// the loaded byte value in the low 8 bits, a class field (code / data /
// tail / unexplored), a type nibble, two per-operand representation
// nibbles, and assorted state bits.  This module renders that word as a
// readable, comma-separated list of flag names for console inspection.

// ── Class field ───────────────────────────────────────────────────────────────

/// Mask of the class bits.
pub const MS_CLS: u64 = 0x0000_0600;
/// Code.
pub const FF_CODE: u64 = 0x0000_0600;
/// Data.
pub const FF_DATA: u64 = 0x0000_0400;
/// Tail; second or later byte of an instruction or data item.
pub const FF_TAIL: u64 = 0x0000_0200;
/// Unexplored.
pub const FF_UNK: u64 = 0x0000_0000;

// ── Data type (valid when the class is data) ──────────────────────────────────

/// Data type mask.
pub const DT_TYPE: u64 = 0xF000_0000;
pub const FF_BYTE: u64 = 0x0000_0000;
pub const FF_WORD: u64 = 0x1000_0000;
pub const FF_DWORD: u64 = 0x2000_0000;
pub const FF_QWORD: u64 = 0x3000_0000;
pub const FF_TBYTE: u64 = 0x4000_0000;
pub const FF_STRLIT: u64 = 0x5000_0000;
pub const FF_STRUCT: u64 = 0x6000_0000;
pub const FF_OWORD: u64 = 0x7000_0000;
pub const FF_FLOAT: u64 = 0x8000_0000;
pub const FF_DOUBLE: u64 = 0x9000_0000;
pub const FF_PACKREAL: u64 = 0xA000_0000;
pub const FF_ALIGN: u64 = 0xB000_0000;
pub const FF_CUSTOM: u64 = 0xD000_0000;
pub const FF_YWORD: u64 = 0xE000_0000;
pub const FF_ZWORD: u64 = 0xF000_0000;

// ── Code bits (valid when the class is code) ──────────────────────────────────

/// Code type mask.
pub const MS_CODE: u64 = 0xF000_0000;
/// Function start.
pub const FF_FUNC: u64 = 0x1000_0000;
/// Has an immediate value.
pub const FF_IMMD: u64 = 0x4000_0000;
/// Has a jump table or switch info.
pub const FF_JUMP: u64 = 0x8000_0000;

// ── Operand representation nibbles ────────────────────────────────────────────

/// Mask for the representation of the second operand.
pub const MS_1TYPE: u64 = 0x0F00_0000;
pub const FF_1NUMH: u64 = 0x0100_0000;
pub const FF_1NUMD: u64 = 0x0200_0000;
pub const FF_1CHAR: u64 = 0x0300_0000;
pub const FF_1SEG: u64 = 0x0400_0000;
pub const FF_1OFF: u64 = 0x0500_0000;
pub const FF_1NUMB: u64 = 0x0600_0000;
pub const FF_1NUMO: u64 = 0x0700_0000;
pub const FF_1ENUM: u64 = 0x0800_0000;
pub const FF_1FOP: u64 = 0x0900_0000;
pub const FF_1STRO: u64 = 0x0A00_0000;
pub const FF_1STK: u64 = 0x0B00_0000;
pub const FF_1FLT: u64 = 0x0C00_0000;
pub const FF_1CUST: u64 = 0x0D00_0000;

/// Mask for the representation of the first operand.
pub const MS_0TYPE: u64 = 0x00F0_0000;
pub const FF_0NUMH: u64 = 0x0010_0000;
pub const FF_0NUMD: u64 = 0x0020_0000;
pub const FF_0CHAR: u64 = 0x0030_0000;
pub const FF_0SEG: u64 = 0x0040_0000;
pub const FF_0OFF: u64 = 0x0050_0000;
pub const FF_0NUMB: u64 = 0x0060_0000;
pub const FF_0NUMO: u64 = 0x0070_0000;
pub const FF_0ENUM: u64 = 0x0080_0000;
pub const FF_0FOP: u64 = 0x0090_0000;
pub const FF_0STRO: u64 = 0x00A0_0000;
pub const FF_0STK: u64 = 0x00B0_0000;
pub const FF_0FLT: u64 = 0x00C0_0000;
pub const FF_0CUST: u64 = 0x00D0_0000;

// ── State bits ────────────────────────────────────────────────────────────────

/// Execution flows from the previous instruction.
pub const FF_FLOW: u64 = 0x0001_0000;
/// Inverted operand sign.
pub const FF_SIGN: u64 = 0x0002_0000;
/// Bitwise negation of operands.
pub const FF_BNOT: u64 = 0x0004_0000;
/// Historic, unused.
pub const FF_UNUSED: u64 = 0x0008_0000;
/// Has a comment.
pub const FF_COMM: u64 = 0x0000_0800;
/// Has references.
pub const FF_REF: u64 = 0x0000_1000;
/// Has extra lines before or after.
pub const FF_LINE: u64 = 0x0000_2000;
/// Has a user name.
pub const FF_NAME: u64 = 0x0000_4000;
/// Has a dummy name.
pub const FF_LABL: u64 = 0x0000_8000;
/// The low 8 bits hold a loaded byte value.
pub const FF_IVL: u64 = 0x0000_0100;

/// `true` when the class bits mark the address as data.
pub fn is_data(f: u64) -> bool {
    f & MS_CLS == FF_DATA
}

/// `true` when the class bits mark the address as code.
pub fn is_code(f: u64) -> bool {
    f & MS_CLS == FF_CODE
}

// ── Decoding ──────────────────────────────────────────────────────────────────

/// Decode an address-flag word into a readable name list, e.g.
/// `"FF_DWORD, FF_NAME, FF_DATA, FF_IVL"`.
///
/// With `with_value`, the stored byte value is appended when the
/// value-loaded bit is set.
pub fn flags_string(f: u64, with_value: bool) -> String {
    let mut s = String::new();
    let mut push = |out: &mut String, name: &str| {
        if !out.is_empty() {
            out.push_str(", ");
        }
        out.push_str(name);
    };

    if is_data(f) {
        let name = match f & DT_TYPE {
            FF_WORD => "FF_WORD",
            FF_DWORD => "FF_DWORD",
            FF_QWORD => "FF_QWORD",
            FF_TBYTE => "FF_TBYTE",
            FF_STRLIT => "FF_STRLIT",
            FF_STRUCT => "FF_STRUCT",
            FF_OWORD => "FF_OWORD",
            FF_FLOAT => "FF_FLOAT",
            FF_DOUBLE => "FF_DOUBLE",
            FF_PACKREAL => "FF_PACKREAL",
            FF_ALIGN => "FF_ALIGN",
            FF_CUSTOM => "FF_CUSTOM",
            FF_YWORD => "FF_YWORD",
            FF_ZWORD => "FF_ZWORD",
            _ => "FF_BYTE",
        };
        push(&mut s, name);
    } else if is_code(f) {
        for (bit, name) in [(FF_FUNC, "FF_FUNC"), (FF_IMMD, "FF_IMMD"), (FF_JUMP, "FF_JUMP")] {
            if f & bit != 0 {
                push(&mut s, name);
            }
        }
    }

    if f & MS_1TYPE != 0 {
        let name = match f & MS_1TYPE {
            FF_1NUMH => "FF_1NUMH",
            FF_1NUMD => "FF_1NUMD",
            FF_1CHAR => "FF_1CHAR",
            FF_1SEG => "FF_1SEG",
            FF_1OFF => "FF_1OFF",
            FF_1NUMB => "FF_1NUMB",
            FF_1NUMO => "FF_1NUMO",
            FF_1ENUM => "FF_1ENUM",
            FF_1FOP => "FF_1FOP",
            FF_1STRO => "FF_1STRO",
            FF_1STK => "FF_1STK",
            FF_1FLT => "FF_1FLT",
            _ => "FF_1CUST",
        };
        push(&mut s, name);
    }

    if f & MS_0TYPE != 0 {
        let name = match f & MS_0TYPE {
            FF_0NUMH => "FF_0NUMH",
            FF_0NUMD => "FF_0NUMD",
            FF_0CHAR => "FF_0CHAR",
            FF_0SEG => "FF_0SEG",
            FF_0OFF => "FF_0OFF",
            FF_0NUMB => "FF_0NUMB",
            FF_0NUMO => "FF_0NUMO",
            FF_0ENUM => "FF_0ENUM",
            FF_0FOP => "FF_0FOP",
            FF_0STRO => "FF_0STRO",
            FF_0STK => "FF_0STK",
            FF_0FLT => "FF_0FLT",
            _ => "FF_0CUST",
        };
        push(&mut s, name);
    }

    for (bit, name) in [
        (FF_FLOW, "FF_FLOW"),
        (FF_SIGN, "FF_SIGN"),
        (FF_BNOT, "FF_BNOT"),
        (FF_UNUSED, "FF_UNUSED"),
        (FF_REF, "FF_REF"),
        (FF_LINE, "FF_LINE"),
        (FF_NAME, "FF_NAME"),
        (FF_LABL, "FF_LABL"),
    ] {
        if f & bit != 0 {
            push(&mut s, name);
        }
    }

    // The class name is always present, even for an unexplored byte.
    let class = match f & MS_CLS {
        FF_CODE => "FF_CODE",
        FF_DATA => "FF_DATA",
        FF_TAIL => "FF_TAIL",
        _ => "FF_UNK",
    };
    push(&mut s, class);

    if f & FF_COMM != 0 {
        push(&mut s, "FF_COMM");
    }
    if f & FF_IVL != 0 {
        push(&mut s, "FF_IVL");
    }

    if with_value && (f & FF_IVL != 0) {
        s.push_str(&format!(", value: {:02X}", f & 0xFF));
    }

    s
}

/// Log the decoded flags for an address to the host console.
pub fn dump_flags(ea: u64, f: u64, with_value: bool) {
    log::info!("{ea:X} flags: {}", flags_string(f, with_value));
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexplored_byte() {
        assert_eq!(flags_string(0, false), "FF_UNK");
    }

    #[test]
    fn data_dword_with_name_and_value() {
        let f = FF_DATA | FF_DWORD | FF_NAME | FF_IVL | 0x55;
        assert_eq!(
            flags_string(f, true),
            "FF_DWORD, FF_NAME, FF_DATA, FF_IVL, value: 55"
        );
    }

    #[test]
    fn value_suffix_requires_loaded_bit() {
        let f = FF_DATA | FF_BYTE | 0x55; // no FF_IVL
        assert_eq!(flags_string(f, true), "FF_BYTE, FF_DATA");
    }

    #[test]
    fn code_function_start() {
        let f = FF_CODE | FF_FUNC | FF_FLOW | FF_REF;
        assert_eq!(flags_string(f, false), "FF_FUNC, FF_FLOW, FF_REF, FF_CODE");
    }

    #[test]
    fn code_with_both_operand_nibbles() {
        let f = FF_CODE | FF_IMMD | FF_1STK | FF_0OFF;
        assert_eq!(
            flags_string(f, false),
            "FF_IMMD, FF_1STK, FF_0OFF, FF_CODE"
        );
    }

    #[test]
    fn tail_byte() {
        let f = FF_TAIL | FF_IVL | 0x90;
        assert_eq!(flags_string(f, true), "FF_TAIL, FF_IVL, value: 90");
    }

    #[test]
    fn string_literal_with_comment() {
        let f = FF_DATA | FF_STRLIT | FF_COMM;
        assert_eq!(flags_string(f, false), "FF_STRLIT, FF_DATA, FF_COMM");
    }

    #[test]
    fn class_predicates() {
        assert!(is_code(FF_CODE | FF_FUNC));
        assert!(is_data(FF_DATA));
        assert!(!is_data(FF_TAIL));
        assert!(!is_code(FF_DATA));
    }
}
