// src/services/mime.rs
// DOCUMENTATION: Content-type sniffing
// PURPOSE: Derive the MIME type of a stored photo from its leading bytes

/// Bytes needed to recognize every supported format
pub const SNIFF_LEN: usize = 512;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Identify a file from its first bytes
/// DOCUMENTATION: Extensions are never consulted; uploads arriving by MMS
/// or email are often stored without a reliable one.
pub fn sniff(head: &[u8]) -> &'static str {
    let head = &head[..head.len().min(SNIFF_LEN)];

    if head.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return "image/jpeg";
    }
    if head.starts_with(b"\x89PNG\r\n\x1a\n") {
        return "image/png";
    }
    if head.starts_with(b"GIF87a") || head.starts_with(b"GIF89a") {
        return "image/gif";
    }
    if head.len() >= 12 && &head[..4] == b"RIFF" && &head[8..12] == b"WEBP" {
        return "image/webp";
    }
    if let Some(mime) = sniff_iso_bmff(head) {
        return mime;
    }
    if head.starts_with(b"BM") && head.len() >= 14 {
        return "image/bmp";
    }
    if head.starts_with(b"II*\0") || head.starts_with(b"MM\0*") {
        return "image/tiff";
    }
    if head.starts_with(b"%PDF-") {
        return "application/pdf";
    }

    OCTET_STREAM
}

/// HEIC/HEIF/AVIF: `....ftyp<brand>` with the brand naming the format
fn sniff_iso_bmff(head: &[u8]) -> Option<&'static str> {
    if head.len() < 12 || &head[4..8] != b"ftyp" {
        return None;
    }

    match &head[8..12] {
        b"heic" | b"heix" | b"hevc" | b"hevx" => Some("image/heic"),
        b"mif1" | b"msf1" | b"heim" | b"heis" => Some("image/heif"),
        b"avif" | b"avis" => Some("image/avif"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_photo_formats() {
        assert_eq!(sniff(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]), "image/jpeg");
        assert_eq!(sniff(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR"), "image/png");
        assert_eq!(sniff(b"GIF89a\x01\x00"), "image/gif");
        assert_eq!(sniff(b"RIFF\x24\x00\x00\x00WEBPVP8 "), "image/webp");
    }

    #[test]
    fn test_iphone_heic() {
        assert_eq!(sniff(b"\0\0\0\x18ftypheic\0\0\0\0mif1heic"), "image/heic");
        assert_eq!(sniff(b"\0\0\0\x18ftypmif1\0\0\0\0mif1heic"), "image/heif");
        // mp4 shares the container but is not a photo
        assert_eq!(sniff(b"\0\0\0\x18ftypisom\0\0\0\0"), OCTET_STREAM);
    }

    #[test]
    fn test_documents_and_unknown() {
        assert_eq!(sniff(b"%PDF-1.7\n"), "application/pdf");
        assert_eq!(sniff(b"II*\0\x08\0\0\0"), "image/tiff");
        assert_eq!(sniff(b"hello world"), OCTET_STREAM);
        assert_eq!(sniff(b""), OCTET_STREAM);
    }
}
