//! Integration tests for csv-scout

use std::io::Write;

use csv_scout::sniff::{detect_delimiter, detect_escape_prefix, detect_record_delimiter};
use csv_scout::{
    CancelToken, CharSource, Culture, DataType, Escape, Quote, RecordDelimiter, Scout, TextSource,
    read_record,
};
use tempfile::NamedTempFile;

#[test]
fn test_magic_keyword_precedence() {
    // The rest of the file is consistently comma-delimited; `sep=` wins
    // regardless.
    let data = "sep=;\na,b,c\nd,e,f\ng,h,i\n";
    let mut source = TextSource::new(data);
    let guess = detect_delimiter(
        &mut source,
        Some('"'),
        None,
        &[],
        &Culture::EN_US,
        &CancelToken::new(),
    );
    assert_eq!(guess.delimiter, ';');
    assert!(guess.is_detected);
    assert!(guess.from_magic_keyword);
}

#[test]
fn test_sniffer_idempotence() {
    let data = "x;y;z\n1;2;3\n4;5;6\n7;8;9\n";
    let mut source = TextSource::new(data);
    let cancel = CancelToken::new();
    let first = detect_delimiter(&mut source, Some('"'), None, &[], &Culture::EN_US, &cancel);
    source.rewind_to_start().unwrap();
    let second = detect_delimiter(&mut source, Some('"'), None, &[], &Culture::EN_US, &cancel);
    assert_eq!(first, second);
}

#[test]
fn test_tokenizer_roundtrip() {
    let mut source = TextSource::new("a,\"b,c\",\"d\"\"e\",f\n");
    let record = read_record(&mut source, ',', Some('"'), None, "").unwrap();
    assert_eq!(record, vec!["a", "b,c", "d\"e", "f"]);
}

#[test]
fn test_clean_csv_delimiter_detection() {
    let mut data = String::new();
    for i in 0..10 {
        data.push_str(&format!("alpha{i},beta{i},gamma{i},delta{i}\n"));
    }
    let mut source = TextSource::new(&data);
    let guess = detect_delimiter(
        &mut source,
        Some('"'),
        None,
        &[],
        &Culture::EN_US,
        &CancelToken::new(),
    );
    assert_eq!(guess.delimiter, ',');
    assert!(guess.is_detected);
}

#[test]
fn test_escape_prefix_rejection() {
    // Backslashes only ever precede letters: no escape convention.
    let data = "one\\two,alpha\nthree\\four,beta\nfive\\six,gamma\n";
    let mut source = TextSource::new(data);
    let escape = detect_escape_prefix(&mut source, ',', Some('"'), &CancelToken::new());
    assert_eq!(escape, Escape::Disabled);
}

#[test]
fn test_record_delimiter_tiebreak() {
    let data = "a,b\r\nc,d\ne,f";
    let mut source = TextSource::new(data);
    let kind = detect_record_delimiter(&mut source, Some('"'), &CancelToken::new());
    assert_eq!(kind, RecordDelimiter::Crlf);
}

#[test]
fn test_header_accepted_for_clean_names() {
    let mut data = String::from("region,units,price,shipped\n");
    for i in 0..12 {
        data.push_str(&format!("north{i},{i},{i}.99,2023-06-{:02}\n", i + 1));
    }
    let detection = Scout::new().sniff_text(&data).unwrap();
    assert!(detection.dialect.header.has_header_row);
    assert_eq!(
        detection.columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
        vec!["region", "units", "price", "shipped"]
    );
}

#[test]
fn test_header_rejected_for_numeric_row() {
    let mut data = String::from("10,20,30,40\n");
    for i in 0..12 {
        data.push_str(&format!("{i},{i},{i},{i}\n"));
    }
    let detection = Scout::new().sniff_text(&data).unwrap();
    assert!(!detection.dialect.header.has_header_row);
}

#[test]
fn test_packed_dates_not_integers() {
    let mut data = String::from("when\n");
    for sample in ["20230101", "20230215", "20221231", "20230310", "20230422"] {
        data.push_str(sample);
        data.push('\n');
    }
    let detection = Scout::new().sniff_text(&data).unwrap();
    let column = &detection.columns[0];
    assert_eq!(column.format.data_type, DataType::DateTime);
    assert_eq!(column.format.date_format, "yyyyMMdd");
}

#[test]
fn test_locale_sensitive_decimals() {
    let mut data = String::from("amount;note\n");
    for value in ["1.234,56", "2.000,00", "3.111,22", "4.999,99", "5.250,75"] {
        data.push_str(&format!("{value};x\n"));
    }
    let detection = Scout::new().sniff_text(&data).unwrap();
    let column = &detection.columns[0];
    assert_eq!(column.format.decimal_separator, ',');
    assert_eq!(column.format.group_separator, Some('.'));
}

#[test]
fn test_quoted_fields_detected() {
    let mut data = String::new();
    for i in 0..8 {
        data.push_str(&format!("\"item {i}\",\"note, detail {i}\",{i}\n"));
    }
    let detection = Scout::new().sniff_text(&data).unwrap();
    assert_eq!(detection.dialect.delimiter, ',');
    assert_eq!(detection.dialect.quote, Quote::Some('"'));
    assert!(detection.qualifier_guess.score > 0);
}

#[test]
fn test_comment_lines_skipped() {
    let data = "# export from tool\n# version 3\nname,age\nalice,30\nbob,25\ncarol,41\n";
    let detection = Scout::new().sniff_text(data).unwrap();
    assert_eq!(detection.dialect.delimiter, ',');
    assert!(detection.dialect.header.has_header_row);
    assert_eq!(detection.columns[0].name, "name");
}

#[test]
fn test_sniff_tab_separated() {
    let data = "alpha\tbeta\tgamma\n1\t2\t3\n4\t5\t6\n7\t8\t9\n";
    let detection = Scout::new().sniff_text(data).unwrap();
    assert_eq!(detection.dialect.delimiter, '\t');
    assert_eq!(detection.num_fields, 3);
}

#[test]
fn test_sniff_path_on_disk() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        "id,label,ratio\n1,first,0.25\n2,second,0.50\n3,third,0.75\n4,fourth,1.00\n5,fifth,1.25\n"
    )
    .unwrap();
    let detection = Scout::new().sniff_path(file.path()).unwrap();
    assert_eq!(detection.dialect.delimiter, ',');
    assert!(detection.dialect.header.has_header_row);
    assert_eq!(detection.columns[0].format.data_type, DataType::Integer);
    assert_eq!(detection.columns[2].format.data_type, DataType::Numeric);
}

#[test]
fn test_change_log_mentions_each_guess() {
    let data = "a,b\n1,2\n3,4\n5,6\n";
    let detection = Scout::new().sniff_text(data).unwrap();
    let log = detection.change_log.join("\n");
    assert!(log.contains("Record delimiter"));
    assert!(log.contains("Delimiter"));
    assert!(log.contains("Column"));
}

#[test]
fn test_crlf_terminator_reported() {
    let data = "a,b\r\n1,2\r\n3,4\r\n";
    let detection = Scout::new().sniff_text(data).unwrap();
    assert_eq!(detection.dialect.terminator, RecordDelimiter::Crlf);
}

#[test]
fn test_dialect_drives_csv_reader() {
    let data = "name;age\n'smith; jo';31\n'doe; jane';28\n'roe; rick';45\n";
    let detection = Scout::new().sniff_text(data).unwrap();
    assert_eq!(detection.dialect.delimiter, ';');
    assert_eq!(detection.dialect.quote, Quote::Some('\''));

    let mut reader = detection.dialect.reader_builder().from_reader(data.as_bytes());
    let mut record = csv::StringRecord::new();
    assert!(reader.read_record(&mut record).unwrap());
    assert_eq!(&record[0], "smith; jo");
}

#[test]
fn test_boolean_column() {
    let data = "flag\ntrue\nfalse\ntrue\nfalse\ntrue\n";
    let detection = Scout::new().sniff_text(data).unwrap();
    assert_eq!(detection.columns[0].format.data_type, DataType::Boolean);
}

#[test]
fn test_guid_column() {
    let mut data = String::from("token,n\n");
    for i in 0..6 {
        data.push_str(&format!("550e8400-e29b-41d4-a716-44665544000{i},{i}\n"));
    }
    let detection = Scout::new().sniff_text(&data).unwrap();
    assert_eq!(detection.columns[0].format.data_type, DataType::Guid);
}
