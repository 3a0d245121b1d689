//! Cell styles written to `xl/styles.xml`.
//!
//! Styles are presentational only. The ids double as row tags when a
//! workbook written by this crate is loaded again.

/// Cell format index (`s` attribute) into the fixed `cellXfs` table below.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CellStyle {
    #[default]
    Default,
    /// Bold, grey fill, centered, thin border
    Header,
    /// Thin border, wrapped text, top aligned
    Body,
    /// Bold on light green
    Pass,
    /// Bold on light orange
    Fail,
    /// Bold on light yellow
    Skip,
    /// Bold label of the summary block
    SummaryLabel,
    /// Bold status without fill
    Status,
}

impl CellStyle {
    pub const fn id(&self) -> usize {
        match self {
            CellStyle::Default => 0,
            CellStyle::Header => 1,
            CellStyle::Body => 2,
            CellStyle::Pass => 3,
            CellStyle::Fail => 4,
            CellStyle::Skip => 5,
            CellStyle::SummaryLabel => 6,
            CellStyle::Status => 7,
        }
    }

    /// Maps a format index back; unknown indexes read as the default style.
    pub fn from_id(id: usize) -> CellStyle {
        match id {
            1 => CellStyle::Header,
            2 => CellStyle::Body,
            3 => CellStyle::Pass,
            4 => CellStyle::Fail,
            5 => CellStyle::Skip,
            6 => CellStyle::SummaryLabel,
            7 => CellStyle::Status,
            _ => CellStyle::Default,
        }
    }
}

pub(crate) const STYLES_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    r#"<fonts count="3">"#,
    r#"<font><sz val="11"/><name val="Calibri"/><family val="2"/></font>"#,
    r#"<font><b/><sz val="11"/><name val="Calibri"/><family val="2"/></font>"#,
    r#"<font><b/><sz val="12"/><name val="Calibri"/><family val="2"/></font>"#,
    r#"</fonts>"#,
    r#"<fills count="6">"#,
    r#"<fill><patternFill patternType="none"/></fill>"#,
    r#"<fill><patternFill patternType="gray125"/></fill>"#,
    r#"<fill><patternFill patternType="solid"><fgColor rgb="FFC0C0C0"/><bgColor indexed="64"/></patternFill></fill>"#,
    r#"<fill><patternFill patternType="solid"><fgColor rgb="FFCCFFCC"/><bgColor indexed="64"/></patternFill></fill>"#,
    r#"<fill><patternFill patternType="solid"><fgColor rgb="FFFFCC99"/><bgColor indexed="64"/></patternFill></fill>"#,
    r#"<fill><patternFill patternType="solid"><fgColor rgb="FFFFFF99"/><bgColor indexed="64"/></patternFill></fill>"#,
    r#"</fills>"#,
    r#"<borders count="2">"#,
    r#"<border><left/><right/><top/><bottom/><diagonal/></border>"#,
    r#"<border><left style="thin"/><right style="thin"/><top style="thin"/><bottom style="thin"/><diagonal/></border>"#,
    r#"</borders>"#,
    r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
    r#"<cellXfs count="8">"#,
    r#"<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>"#,
    r#"<xf numFmtId="0" fontId="2" fillId="2" borderId="1" xfId="0" applyFont="1" applyFill="1" applyBorder="1" applyAlignment="1"><alignment horizontal="center"/></xf>"#,
    r#"<xf numFmtId="0" fontId="0" fillId="0" borderId="1" xfId="0" applyBorder="1" applyAlignment="1"><alignment vertical="top" wrapText="1"/></xf>"#,
    r#"<xf numFmtId="0" fontId="1" fillId="3" borderId="1" xfId="0" applyFont="1" applyFill="1" applyBorder="1" applyAlignment="1"><alignment horizontal="center" vertical="top" wrapText="1"/></xf>"#,
    r#"<xf numFmtId="0" fontId="1" fillId="4" borderId="1" xfId="0" applyFont="1" applyFill="1" applyBorder="1" applyAlignment="1"><alignment horizontal="center" vertical="top" wrapText="1"/></xf>"#,
    r#"<xf numFmtId="0" fontId="1" fillId="5" borderId="1" xfId="0" applyFont="1" applyFill="1" applyBorder="1" applyAlignment="1"><alignment horizontal="center" vertical="top" wrapText="1"/></xf>"#,
    r#"<xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/>"#,
    r#"<xf numFmtId="0" fontId="1" fillId="0" borderId="1" xfId="0" applyFont="1" applyBorder="1" applyAlignment="1"><alignment horizontal="center" vertical="top" wrapText="1"/></xf>"#,
    r#"</cellXfs>"#,
    r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
    r#"</styleSheet>"#,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_ids_round_trip() {
        for style in [
            CellStyle::Default,
            CellStyle::Header,
            CellStyle::Body,
            CellStyle::Pass,
            CellStyle::Fail,
            CellStyle::Skip,
            CellStyle::SummaryLabel,
            CellStyle::Status,
        ] {
            assert_eq!(CellStyle::from_id(style.id()), style);
        }
        assert_eq!(CellStyle::from_id(42), CellStyle::Default);
        assert_eq!(STYLES_XML.matches("<xf ").count(), 9);
    }
}
