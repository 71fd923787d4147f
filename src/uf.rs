// src/uf.rs

use std::{fmt, str::FromStr};

/// Brazilian federative units, in the order the registry is crawled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Uf {
    RJ,
    SP,
    ES,
    MG,
    SC,
    RS,
    PR,
    DF,
    GO,
    MT,
    MS,
    MA,
    PI,
    CE,
    RN,
    PB,
    PE,
    AL,
    SE,
    BA,
    RO,
    AC,
    AM,
    RR,
    PA,
    AP,
    TO,
}

impl Uf {
    pub const ALL: [Uf; 27] = [
        Uf::RJ,
        Uf::SP,
        Uf::ES,
        Uf::MG,
        Uf::SC,
        Uf::RS,
        Uf::PR,
        Uf::DF,
        Uf::GO,
        Uf::MT,
        Uf::MS,
        Uf::MA,
        Uf::PI,
        Uf::CE,
        Uf::RN,
        Uf::PB,
        Uf::PE,
        Uf::AL,
        Uf::SE,
        Uf::BA,
        Uf::RO,
        Uf::AC,
        Uf::AM,
        Uf::RR,
        Uf::PA,
        Uf::AP,
        Uf::TO,
    ];

    /// Two-digit IBGE state code, as used in the `VEstado` query parameter.
    pub fn ibge_code(self) -> u8 {
        match self {
            Uf::RO => 11,
            Uf::AC => 12,
            Uf::AM => 13,
            Uf::RR => 14,
            Uf::PA => 15,
            Uf::AP => 16,
            Uf::TO => 17,
            Uf::MA => 21,
            Uf::PI => 22,
            Uf::CE => 23,
            Uf::RN => 24,
            Uf::PB => 25,
            Uf::PE => 26,
            Uf::AL => 27,
            Uf::SE => 28,
            Uf::BA => 29,
            Uf::MG => 31,
            Uf::ES => 32,
            Uf::RJ => 33,
            Uf::SP => 35,
            Uf::PR => 41,
            Uf::SC => 42,
            Uf::RS => 43,
            Uf::MS => 50,
            Uf::MT => 51,
            Uf::GO => 52,
            Uf::DF => 53,
        }
    }

    pub fn acronym(self) -> &'static str {
        match self {
            Uf::RJ => "RJ",
            Uf::SP => "SP",
            Uf::ES => "ES",
            Uf::MG => "MG",
            Uf::SC => "SC",
            Uf::RS => "RS",
            Uf::PR => "PR",
            Uf::DF => "DF",
            Uf::GO => "GO",
            Uf::MT => "MT",
            Uf::MS => "MS",
            Uf::MA => "MA",
            Uf::PI => "PI",
            Uf::CE => "CE",
            Uf::RN => "RN",
            Uf::PB => "PB",
            Uf::PE => "PE",
            Uf::AL => "AL",
            Uf::SE => "SE",
            Uf::BA => "BA",
            Uf::RO => "RO",
            Uf::AC => "AC",
            Uf::AM => "AM",
            Uf::RR => "RR",
            Uf::PA => "PA",
            Uf::AP => "AP",
            Uf::TO => "TO",
        }
    }

    /// Parse a `REGION` value: comma-separated acronyms, or `BR`/`ALL`.
    /// Duplicates are dropped, first occurrence wins.
    pub fn parse_list(s: &str) -> Result<Vec<Uf>, String> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("BR") || trimmed.eq_ignore_ascii_case("ALL") {
            return Ok(Uf::ALL.to_vec());
        }
        let mut out: Vec<Uf> = Vec::new();
        for part in trimmed.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let uf: Uf = part.parse()?;
            if !out.contains(&uf) {
                out.push(uf);
            }
        }
        if out.is_empty() {
            return Err("REGION lists no federative unit".to_string());
        }
        Ok(out)
    }
}

impl fmt::Display for Uf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.acronym())
    }
}

impl FromStr for Uf {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Uf::ALL
            .iter()
            .copied()
            .find(|uf| uf.acronym() == upper)
            .ok_or_else(|| format!("unknown federative unit `{}`", s.trim()))
    }
}
