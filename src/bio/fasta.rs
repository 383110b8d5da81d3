use crate::bio::sequence::SequenceRecord;
use crate::DanbError;
use flate2::read::GzDecoder;
use memmap2::Mmap;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_till},
    character::complete::{line_ending, space1},
    combinator::{eof, opt},
    sequence::preceded,
    IResult,
};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

fn is_line_end(c: u8) -> bool {
    c == b'\n' || c == b'\r'
}

/// Parse a FASTA header line into its id token and optional description.
///
/// `\n`, `\r\n` and a lone `\r` all end the line.
fn parse_header(input: &[u8]) -> IResult<&[u8], (&[u8], Option<&[u8]>)> {
    let (input, _) = tag(b">")(input)?;
    let (input, id) = take_till(|c: u8| c == b' ' || c == b'\t' || is_line_end(c))(input)?;
    let (input, description) = opt(preceded(space1, take_till(is_line_end)))(input)?;
    let (input, _) = alt((line_ending, tag(b"\r"), eof))(input)?;
    Ok((input, (id, description)))
}

/// Parse sequence lines until the next header or EOF
fn parse_sequence(input: &[u8]) -> IResult<&[u8], String> {
    let mut sequence = String::new();
    let mut remaining = input;

    while !remaining.is_empty() && remaining[0] != b'>' {
        let (rest, line) = take_till(|c: u8| c == b'\n' || c == b'\r')(remaining)?;
        let (rest, _) = opt(alt((line_ending, tag(b"\r"))))(rest)?;

        sequence.extend(
            line.iter()
                .filter(|c| !c.is_ascii_whitespace())
                .map(|&c| c as char),
        );

        remaining = rest;
    }

    Ok((remaining, sequence))
}

fn parse_record(input: &[u8]) -> IResult<&[u8], SequenceRecord> {
    let (input, (id, description)) = parse_header(input)?;
    let (input, sequence) = parse_sequence(input)?;

    let mut record = SequenceRecord::new(String::from_utf8_lossy(id), sequence);
    if let Some(desc) = description {
        let desc = String::from_utf8_lossy(desc);
        let desc = desc.trim_end();
        if !desc.is_empty() {
            record = record.with_description(desc);
        }
    }

    Ok((input, record))
}

/// Skip any text that precedes the first header
fn skip_preamble(mut input: &[u8]) -> &[u8] {
    while !input.is_empty() && input[0] != b'>' {
        match input.iter().position(|&c| c == b'\n') {
            Some(pos) => input = &input[pos + 1..],
            None => return &[],
        }
    }
    input
}

/// Parse FASTA from bytes, keeping records in file order
pub fn parse_fasta_from_bytes(data: &[u8]) -> Result<Vec<SequenceRecord>, DanbError> {
    let mut records = Vec::new();
    let mut remaining = skip_preamble(data);

    while !remaining.is_empty() {
        let (rest, record) = parse_record(remaining)
            .map_err(|e| DanbError::Parse(format!("Failed to parse FASTA record: {:?}", e)))?;
        records.push(record);
        remaining = rest;
    }

    Ok(records)
}

/// Parse a FASTA file into records (supports .gz compression)
pub fn parse_fasta<P: AsRef<Path>>(path: P) -> Result<Vec<SequenceRecord>, DanbError> {
    let path = path.as_ref();

    if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        parse_fasta_gzip(path)
    } else {
        parse_fasta_uncompressed(path)
    }
}

fn parse_fasta_uncompressed(path: &Path) -> Result<Vec<SequenceRecord>, DanbError> {
    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(Vec::new());
    }
    let mmap = unsafe { Mmap::map(&file)? };

    parse_fasta_from_bytes(&mmap[..])
}

fn parse_fasta_gzip(path: &Path) -> Result<Vec<SequenceRecord>, DanbError> {
    let file = File::open(path)?;
    let mut decoder = GzDecoder::new(BufReader::new(file));
    let mut buffer = Vec::new();
    decoder.read_to_end(&mut buffer)?;

    parse_fasta_from_bytes(&buffer)
}

/// Write records to a FASTA file (supports .gz compression)
pub fn write_fasta<P: AsRef<Path>>(path: P, records: &[SequenceRecord]) -> Result<(), DanbError> {
    use flate2::write::GzEncoder;
    use flate2::Compression;

    let path = path.as_ref();
    let file = File::create(path)?;

    if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        let encoder = GzEncoder::new(file, Compression::default());
        let mut writer = BufWriter::new(encoder);
        write_fasta_to_writer(&mut writer, records)?;
        writer.flush()?;
    } else {
        let mut writer = BufWriter::new(file);
        write_fasta_to_writer(&mut writer, records)?;
        writer.flush()?;
    }

    Ok(())
}

fn write_fasta_to_writer<W: Write>(
    writer: &mut W,
    records: &[SequenceRecord],
) -> Result<(), DanbError> {
    for record in records {
        writeln!(writer, "{}", record.header())?;

        // 80-column lines
        for chunk in record.sequence.as_bytes().chunks(80) {
            writeln!(writer, "{}", String::from_utf8_lossy(chunk))?;
        }
    }
    Ok(())
}
