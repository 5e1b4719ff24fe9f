use crate::bio::sequence::SequenceRecord;
use crate::FabulaError;
use flate2::read::GzDecoder;
use memmap2::Mmap;
use nom::{
    bytes::complete::{tag, take_till},
    character::complete::{line_ending, not_line_ending},
    combinator::{map, opt},
    sequence::preceded,
    IResult,
};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Parse a FASTA header line
fn parse_header(input: &[u8]) -> IResult<&[u8], (&str, Option<&str>)> {
    let (input, _) = tag(b">")(input)?;
    let (input, id) = map(
        take_till(|c: u8| c == b' ' || c == b'\t' || c == b'\n' || c == b'\r'),
        |s| std::str::from_utf8(s).unwrap_or(""),
    )(input)?;
    let (input, description) = opt(preceded(
        tag(b" "),
        map(not_line_ending, |s| std::str::from_utf8(s).unwrap_or("")),
    ))(input)?;
    let (input, _) = opt(line_ending)(input)?;
    Ok((input, (id, description)))
}

/// Parse sequence lines until next header or EOF
fn parse_sequence(input: &[u8]) -> IResult<&[u8], Vec<u8>> {
    let mut sequence = Vec::new();
    let mut remaining = input;

    while !remaining.is_empty() && remaining[0] != b'>' {
        let (rest, line) =
            take_till::<_, _, nom::error::Error<_>>(|c: u8| c == b'\n' || c == b'\r')(remaining)?;
        let (rest, _) = opt(line_ending)(rest)?;

        for &c in line {
            if !c.is_ascii_whitespace() {
                sequence.push(c.to_ascii_uppercase());
            }
        }

        remaining = rest;
    }

    Ok((remaining, sequence))
}

/// Parse a single FASTA record
fn parse_record(input: &[u8]) -> IResult<&[u8], SequenceRecord> {
    let (input, (id, description)) = parse_header(input)?;
    let (input, sequence) = parse_sequence(input)?;

    let mut record = SequenceRecord::new(id.to_string(), sequence);
    if let Some(desc) = description {
        record = record.with_description(desc.to_string());
    }

    Ok((input, record))
}

/// Parse a FASTA file into records (supports .gz compression)
pub fn parse_fasta<P: AsRef<Path>>(path: P) -> Result<Vec<SequenceRecord>, FabulaError> {
    let path = path.as_ref();

    if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        parse_fasta_gzip(path)
    } else {
        parse_fasta_uncompressed(path)
    }
}

fn parse_fasta_uncompressed(path: &Path) -> Result<Vec<SequenceRecord>, FabulaError> {
    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Ok(Vec::new());
    }
    let mmap = unsafe { Mmap::map(&file)? };

    parse_fasta_buffer(&mmap[..])
}

fn parse_fasta_gzip(path: &Path) -> Result<Vec<SequenceRecord>, FabulaError> {
    let file = File::open(path)?;
    let mut decoder = GzDecoder::new(BufReader::new(file));
    let mut buffer = Vec::new();
    decoder.read_to_end(&mut buffer)?;

    parse_fasta_buffer(&buffer)
}

/// Parse FASTA from a byte buffer
pub fn parse_fasta_buffer(buffer: &[u8]) -> Result<Vec<SequenceRecord>, FabulaError> {
    let mut input = buffer;
    let mut records = Vec::new();

    while !input.is_empty() {
        // Skip blank lines between records
        while !input.is_empty() && input[0].is_ascii_whitespace() {
            input = &input[1..];
        }

        if input.is_empty() {
            break;
        }

        if input[0] != b'>' {
            return Err(FabulaError::Parse(
                "Expected '>' at start of FASTA record".to_string(),
            ));
        }

        match parse_record(input) {
            Ok((remaining, record)) => {
                if !record.is_empty() {
                    records.push(record);
                }
                input = remaining;
            }
            Err(e) => {
                return Err(FabulaError::Parse(format!("Failed to parse FASTA: {:?}", e)));
            }
        }
    }

    Ok(records)
}

/// Write records to a FASTA file (supports .gz compression)
pub fn write_fasta<P: AsRef<Path>>(
    path: P,
    records: &[SequenceRecord],
) -> Result<(), FabulaError> {
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

/// Write records to any writer, sequence wrapped at 80 columns
fn write_fasta_to_writer<W: Write>(
    writer: &mut W,
    records: &[SequenceRecord],
) -> Result<(), FabulaError> {
    for record in records {
        writeln!(writer, "{}", record.header())?;

        for chunk in record.sequence.chunks(80) {
            writeln!(writer, "{}", String::from_utf8_lossy(chunk))?;
        }
    }
    Ok(())
}
