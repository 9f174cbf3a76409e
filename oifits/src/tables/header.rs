// Copyright 2018-2020 Peter Williams
// Licensed under the MIT License.

//! The keywords of the primary HDU.

use oifits_fits::{Header, HeaderValue};

/// The primary header of an OIFITS file.
///
/// Absent keywords read as empty strings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrimaryHeader {
    pub origin: String,
    pub date_obs: String,
    pub telescop: String,
    pub instrume: String,
    pub insmode: String,
    pub object: String,
    pub referenc: String,
    pub prog_id: String,
    pub procsoft: String,
    pub obstech: String,
}

impl PrimaryHeader {
    fn fields(&self) -> [(&'static str, &str); 10] {
        [
            ("ORIGIN", self.origin.as_str()),
            ("DATE-OBS", self.date_obs.as_str()),
            ("TELESCOP", self.telescop.as_str()),
            ("INSTRUME", self.instrume.as_str()),
            ("INSMODE", self.insmode.as_str()),
            ("OBJECT", self.object.as_str()),
            ("REFERENC", self.referenc.as_str()),
            ("PROG_ID", self.prog_id.as_str()),
            ("PROCSOFT", self.procsoft.as_str()),
            ("OBSTECH", self.obstech.as_str()),
        ]
    }

    /// Pull the OIFITS keywords out of a FITS primary header.
    pub fn from_fits_header(header: &Header) -> Self {
        let get = |k: &str| header.get_str(k).unwrap_or("").to_owned();

        PrimaryHeader {
            origin: get("ORIGIN"),
            date_obs: get("DATE-OBS"),
            telescop: get("TELESCOP"),
            instrume: get("INSTRUME"),
            insmode: get("INSMODE"),
            object: get("OBJECT"),
            referenc: get("REFERENC"),
            prog_id: get("PROG_ID"),
            procsoft: get("PROCSOFT"),
            obstech: get("OBSTECH"),
        }
    }

    /// Build a FITS primary header. When `oifits2` is true, the file is
    /// marked with `CONTENT = 'OIFITS2'`.
    pub fn to_fits_header(&self, oifits2: bool) -> Header {
        let mut header = Header::new();

        if oifits2 {
            header.set("CONTENT", HeaderValue::Text("OIFITS2".to_owned()));
        }

        for (keyword, value) in self.fields().iter() {
            header.set(keyword, HeaderValue::Text((*value).to_owned()));
        }

        header
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_header_conversion() {
        let h = PrimaryHeader {
            origin: "ESO".to_owned(),
            object: "Betelgeuse".to_owned(),
            ..Default::default()
        };

        let fits = h.to_fits_header(true);
        assert_eq!(fits.get_str("CONTENT"), Some("OIFITS2"));
        assert_eq!(fits.get_str("PROG_ID"), Some(""));
        assert_eq!(PrimaryHeader::from_fits_header(&fits), h);
        assert_eq!(h.to_fits_header(false).get_str("CONTENT"), None);
    }
}
