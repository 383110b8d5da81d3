#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const PDB_SINGLE_MODEL: &str = "\
HEADER    LYASE(OXO-ACID)                         09-JUL-93   12CA
ATOM      1  N   SER A   3      -9.861   2.047   8.604  1.00 59.32           N
ATOM      2  CA  SER A   3     -10.547   0.787   8.352  1.00 58.51           C
HETATM    3 ZN    ZN A 262      -6.650  -1.640  15.298  1.00 11.54          ZN
END
";

pub const PDB_TWO_MODELS: &str = "\
MODEL        1
ATOM      1  N   MET A   1      27.340  24.430   2.614  1.00  0.00           N
ATOM      2  CA  MET A   1      26.266  25.413   2.842  1.00  0.00           C
ENDMDL
MODEL        2
ATOM      1  N   MET A   1      26.100  24.000   2.100  1.00  0.00           N
ENDMDL
END
";

pub const CIF_SINGLE_MODEL: &str = "\
data_12CA
#
_entry.id 12CA
#
loop_
_atom_site.group_PDB
_atom_site.id
_atom_site.type_symbol
_atom_site.label_atom_id
_atom_site.label_comp_id
_atom_site.label_asym_id
_atom_site.label_seq_id
_atom_site.Cartn_x
_atom_site.Cartn_y
_atom_site.Cartn_z
_atom_site.auth_seq_id
_atom_site.auth_comp_id
_atom_site.auth_asym_id
_atom_site.auth_atom_id
_atom_site.pdbx_PDB_model_num
ATOM   1 N  N  SER A 1 -9.861  2.047 8.604  3   SER A N  1
ATOM   2 C  CA SER A 1 -10.547 0.787 8.352  3   SER A CA 1
HETATM 3 ZN ZN ZN  B . -6.650 -1.640 15.298 262 ZN  A ZN 1
#
";

pub const PDB_ALTLOC: &str = "\
ATOM      1  N   SER A   3      -9.861   2.047   8.604  1.00 20.00           N
ATOM      2  CA ASER A   3     -10.547   0.787   8.352  1.00 20.00           C
ATOM      3  CA BSER A   3     -10.601   0.801   8.390  1.00 20.00           C
ATOM      4  CB ASER A   3     -11.020   0.102   9.611  1.00 20.00           C
ATOM      5  CB BSER A   3     -11.113   0.150   9.702  1.00 20.00           C
ATOM      6  N  BHIS A   4      -9.100  -0.300   7.200  1.00 20.00           N
ATOM      7  N  AHIS A   4      -9.150  -0.320   7.250  1.00 20.00           N
END
";

pub const CIF_ALTLOC: &str = "\
data_ALT
loop_
_atom_site.group_PDB
_atom_site.id
_atom_site.type_symbol
_atom_site.label_atom_id
_atom_site.label_alt_id
_atom_site.label_comp_id
_atom_site.label_asym_id
_atom_site.label_seq_id
_atom_site.pdbx_PDB_ins_code
_atom_site.Cartn_x
_atom_site.Cartn_y
_atom_site.Cartn_z
_atom_site.pdbx_PDB_model_num
ATOM 1 N N  . SER A 3 ? -9.861  2.047  8.604 1
ATOM 2 C CA A SER A 3 ? -10.547 0.787  8.352 1
ATOM 3 C CA B SER A 3 ? -10.601 0.801  8.390 1
ATOM 4 C CB A SER A 3 ? -11.020 0.102  9.611 1
ATOM 5 C CB B SER A 3 ? -11.113 0.150  9.702 1
ATOM 6 N N  B HIS A 4 ? -9.100  -0.300 7.200 1
ATOM 7 N N  A HIS A 4 ? -9.150  -0.320 7.250 1
#
";

pub const FASTA_12CA: &str = ">12CA_1|Chain A|CARBONIC ANHYDRASE II|Homo sapiens (9606)\n\
MSHHWGYGKHNGPEHWHKDFPIAKGERQSPVDIDTHTAKYDPSLKPLSVSYDQATSLRILNNGHAFNVEFDDSQDKAVLKGGPLDGTYRLIQFHFHWGSLDGQGSEHTVDKKKYAAELHLVHWNTKYGDFGKAVQQPDGLAVLGIFLK\n";

/// Write `content` to `dir/name` and return the path
pub fn write_file(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, content)?;
    Ok(path)
}

/// Gzip `content` into `dir/name`
pub fn write_gz_file(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    let path = dir.join(name);
    let mut encoder = GzEncoder::new(fs::File::create(&path)?, Compression::default());
    encoder.write_all(content.as_bytes())?;
    encoder.finish()?;
    Ok(path)
}

/// Config file pointing every provider endpoint at `base_url`
pub fn write_endpoint_config(dir: &Path, base_url: &str) -> Result<PathBuf> {
    let config = format!(
        "download:\n  \
         uniprot_url: {base}/uniprot\n  \
         rcsb_fasta_url: {base}/fasta/entry\n  \
         rcsb_files_url: {base}/download\n  \
         alphafold_url: {base}/files\n  \
         timeout_secs: 5\n  \
         connect_timeout_secs: 2\n",
        base = base_url
    );
    write_file(dir, "config.yaml", &config)
}

/// The `danb` binary with an isolated home and no ambient log settings
pub fn danb_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("danb").unwrap();
    cmd.env("DANB_HOME", home.path())
        .env_remove("DANB_CONFIG")
        .env_remove("DANB_CACHE_DIR")
        .env_remove("RUST_LOG")
        .env_remove("DANB_LOG")
        .current_dir(home.path());
    cmd
}
